//! Resource and data source traits

use crate::error::Result;
use crate::state::ResourceState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Lifecycle of a single declarative resource
///
/// The host owns the property bag and hands it to the resource, which
/// mutates it in place. After every call `data.id` names whichever remote
/// object is currently authoritative; an empty id tells the host the
/// resource is gone.
#[async_trait]
pub trait ManagedResource: Send + Sync {
    /// Returns the resource type name (e.g., "fastly_user")
    fn type_name(&self) -> &str;

    /// Create the remote object described by `data`
    async fn create(&self, data: &mut ResourceState) -> Result<()>;

    /// Refresh `data` from the remote side
    async fn read(&self, data: &mut ResourceState) -> Result<()>;

    /// Apply the difference between `prior` and `data`
    async fn update(&self, prior: &ResourceState, data: &mut ResourceState) -> Result<()>;

    /// Remove the remote object
    async fn delete(&self, data: &ResourceState) -> Result<()>;

    /// Build a fresh property bag from an existing remote id
    async fn import(&self, id: &str) -> Result<ResourceState>;
}

/// Read-only projection over remote records
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the data source type name (e.g., "fastly_users")
    fn type_name(&self) -> &str;

    async fn read(&self) -> Result<DataSourceState>;
}

/// Result of reading a data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceState {
    /// Opaque identifier (the account the records belong to)
    pub id: String,

    /// One JSON object per record
    pub items: Vec<serde_json::Value>,
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
