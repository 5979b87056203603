//! Fastly provider
//!
//! Entry point for hosts: builds the client once and hands out the
//! resource and data sources that share it.

use crate::client::FastlyClient;
use crate::data_sources::{InvitationsDataSource, UsersDataSource};
use crate::error::{FastlyError, Result};
use crate::resource::UserResource;
use usermgt_cloud::AuthStatus;
use usermgt_config::ProviderConfig;

/// Fastly user management provider
pub struct FastlyProvider {
    client: FastlyClient,
}

impl FastlyProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: FastlyClient::new(config)?,
        })
    }

    pub fn display_name(&self) -> &str {
        "Fastly"
    }

    pub fn client(&self) -> &FastlyClient {
        &self.client
    }

    /// Check that the API key is accepted
    pub async fn check_auth(&self) -> Result<AuthStatus> {
        match self.client.current_user().await {
            Ok(user) => Ok(AuthStatus::ok(format!(
                "{} (customer {})",
                user.login, user.customer_id
            ))),
            Err(FastlyError::Remote { status, body }) if status == 401 || status == 403 => {
                Ok(AuthStatus::failed(format!("{}: {}", status, body)))
            }
            Err(e) => Err(e),
        }
    }

    pub fn user_resource(&self) -> UserResource<FastlyClient> {
        UserResource::new(self.client.clone())
    }

    pub fn users(&self) -> UsersDataSource<FastlyClient> {
        UsersDataSource::new(self.client.clone())
    }

    pub fn invitations(&self) -> InvitationsDataSource<FastlyClient> {
        InvitationsDataSource::new(self.client.clone())
    }
}
