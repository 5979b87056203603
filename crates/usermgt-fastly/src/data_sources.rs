//! `fastly_users` and `fastly_invitations` data sources

use crate::directory::AccountDirectory;
use async_trait::async_trait;
use usermgt_cloud::{DataSource, DataSourceState};

pub const USERS_DATA_SOURCE: &str = "fastly_users";
pub const INVITATIONS_DATA_SOURCE: &str = "fastly_invitations";

/// Every user of the current account
pub struct UsersDataSource<D> {
    directory: D,
}

impl<D> UsersDataSource<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<D: AccountDirectory> DataSource for UsersDataSource<D> {
    fn type_name(&self) -> &str {
        USERS_DATA_SOURCE
    }

    async fn read(&self) -> usermgt_cloud::Result<DataSourceState> {
        let account_id = self.directory.current_account_id().await?;
        let users = self.directory.list_users(&account_id).await?;
        tracing::debug!("Listed {} users for {}", users.len(), account_id);

        let items = users
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DataSourceState {
            id: account_id,
            items,
        })
    }
}

/// Every pending invitation of the current account
pub struct InvitationsDataSource<D> {
    directory: D,
}

impl<D> InvitationsDataSource<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<D: AccountDirectory> DataSource for InvitationsDataSource<D> {
    fn type_name(&self) -> &str {
        INVITATIONS_DATA_SOURCE
    }

    async fn read(&self) -> usermgt_cloud::Result<DataSourceState> {
        let account_id = self.directory.current_account_id().await?;
        let invitations = self.directory.list_invitations().await?;
        tracing::debug!("Listed {} invitations", invitations.len());

        let items = invitations
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DataSourceState {
            id: account_id,
            items,
        })
    }
}
