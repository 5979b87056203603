//! Domain records of the account API

use crate::error::{FastlyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role granted to an account member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Billing,
    Engineer,
    Superuser,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Billing, Role::Engineer, Role::Superuser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Billing => "billing",
            Role::Engineer => "engineer",
            Role::Superuser => "superuser",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FastlyError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                FastlyError::InvalidConfig(format!(
                    "role must be one of user, billing, engineer, superuser (got {:?})",
                    s
                ))
            })
    }
}

/// A provisioned account member, as returned by `/user/{id}`
///
/// `role` is kept verbatim so list views never fail on roles this crate
/// does not model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub two_factor_auth_enabled: bool,
    #[serde(default)]
    pub limit_services: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteUser {
    /// The role as a [`Role`], failing on anything outside the four known roles
    pub fn parsed_role(&self) -> Result<Role> {
        self.role.parse().map_err(|_| {
            FastlyError::Decode(format!("user {} has unknown role {:?}", self.id, self.role))
        })
    }
}

/// A pending request for someone to join the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub email: String,
    pub role: String,
    pub status_code: i64,
}

/// Fields to change on an accepted user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}
