//! Account directory abstraction
//!
//! [`crate::FastlyClient`] is the production implementation; the state
//! machine only depends on this trait.

use crate::error::{FastlyError, Result};
use crate::model::{Invitation, RemoteUser, Role, UserUpdate};
use async_trait::async_trait;

/// Typed operations over the account's users and invitations
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Customer id of the account the credential belongs to
    async fn current_account_id(&self) -> Result<String>;

    async fn list_users(&self, account_id: &str) -> Result<Vec<RemoteUser>>;

    /// Fails with [`FastlyError::NotFound`] when the id is unknown
    async fn get_user(&self, user_id: &str) -> Result<RemoteUser>;

    async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<RemoteUser>;

    /// Fails with [`FastlyError::NotFound`] when the id is unknown
    async fn delete_user(&self, user_id: &str) -> Result<()>;

    async fn list_invitations(&self) -> Result<Vec<Invitation>>;

    async fn create_invitation(
        &self,
        email: &str,
        role: Role,
        account_id: &str,
    ) -> Result<Invitation>;

    async fn delete_invitation(&self, invitation_id: &str) -> Result<()>;

    /// First user whose login equals `login` exactly
    async fn find_user_by_login(
        &self,
        account_id: &str,
        login: &str,
    ) -> Result<Option<RemoteUser>> {
        let users = self.list_users(account_id).await?;
        Ok(users.into_iter().find(|u| u.login == login))
    }

    /// First invitation whose email equals `email` exactly
    async fn find_invitation_by_email(&self, email: &str) -> Result<Option<Invitation>> {
        let invitations = self.list_invitations().await?;
        Ok(invitations.into_iter().find(|i| i.email == email))
    }

    /// The API has no single-invitation GET, so this scans the list
    async fn get_invitation(&self, invitation_id: &str) -> Result<Invitation> {
        let invitations = self.list_invitations().await?;
        invitations
            .into_iter()
            .find(|i| i.id == invitation_id)
            .ok_or_else(|| FastlyError::NotFound(format!("invitation {}", invitation_id)))
    }
}
