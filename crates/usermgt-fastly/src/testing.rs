//! In-memory [`AccountDirectory`] for unit tests

use crate::directory::AccountDirectory;
use crate::error::{FastlyError, Result};
use crate::model::{Invitation, RemoteUser, Role, UserUpdate};
use async_trait::async_trait;
use std::sync::Mutex;

pub const ACCOUNT_ID: &str = "c-1";

#[derive(Default)]
struct Inner {
    users: Vec<RemoteUser>,
    invitations: Vec<Invitation>,
    next_invitation: u32,
    calls: usize,
    fail_lists: bool,
    fail_invitation_deletes: bool,
    fail_user_deletes: bool,
}

#[derive(Default)]
pub struct MemoryDirectory {
    inner: Mutex<Inner>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: &str, login: &str, name: &str, role: &str) {
        self.inner.lock().unwrap().users.push(RemoteUser {
            id: id.into(),
            login: login.into(),
            name: name.into(),
            role: role.into(),
            customer_id: ACCOUNT_ID.into(),
            locked: false,
            two_factor_auth_enabled: false,
            limit_services: false,
            created_at: None,
            updated_at: None,
        });
    }

    pub fn add_invitation(&self, id: &str, email: &str, role: &str) {
        self.inner.lock().unwrap().invitations.push(Invitation {
            id: id.into(),
            email: email.into(),
            role: role.into(),
            status_code: 0,
        });
    }

    /// Every list call answers 500
    pub fn fail_lists(&self) {
        self.inner.lock().unwrap().fail_lists = true;
    }

    pub fn fail_invitation_deletes(&self) {
        self.inner.lock().unwrap().fail_invitation_deletes = true;
    }

    /// `delete_user` answers 500
    pub fn fail_user_deletes(&self) {
        self.inner.lock().unwrap().fail_user_deletes = true;
    }

    pub fn invitations(&self) -> Vec<Invitation> {
        self.inner.lock().unwrap().invitations.clone()
    }

    pub fn user(&self, id: &str) -> Option<RemoteUser> {
        let inner = self.inner.lock().unwrap();
        inner.users.iter().find(|u| u.id == id).cloned()
    }

    /// Number of directory operations performed so far
    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    fn begin(&self) -> std::sync::MutexGuard<'_, Inner> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;
        inner
    }
}

fn server_error() -> FastlyError {
    FastlyError::Remote {
        status: 500,
        body: "internal error".into(),
    }
}

#[async_trait]
impl AccountDirectory for MemoryDirectory {
    async fn current_account_id(&self) -> Result<String> {
        drop(self.begin());
        Ok(ACCOUNT_ID.into())
    }

    async fn list_users(&self, account_id: &str) -> Result<Vec<RemoteUser>> {
        let inner = self.begin();
        if inner.fail_lists {
            return Err(server_error());
        }
        Ok(inner
            .users
            .iter()
            .filter(|u| u.customer_id == account_id)
            .cloned()
            .collect())
    }

    async fn get_user(&self, user_id: &str) -> Result<RemoteUser> {
        let inner = self.begin();
        inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| FastlyError::NotFound(format!("user {}", user_id)))
    }

    async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<RemoteUser> {
        let mut inner = self.begin();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| FastlyError::NotFound(format!("user {}", user_id)))?;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(role) = update.role {
            user.role = role.to_string();
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let mut inner = self.begin();
        if inner.fail_user_deletes {
            return Err(server_error());
        }
        let before = inner.users.len();
        inner.users.retain(|u| u.id != user_id);
        if inner.users.len() == before {
            return Err(FastlyError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    async fn list_invitations(&self) -> Result<Vec<Invitation>> {
        let inner = self.begin();
        if inner.fail_lists {
            return Err(server_error());
        }
        Ok(inner.invitations.clone())
    }

    async fn create_invitation(
        &self,
        email: &str,
        role: Role,
        _account_id: &str,
    ) -> Result<Invitation> {
        let mut inner = self.begin();
        inner.next_invitation += 1;
        let invitation = Invitation {
            id: format!("inv-{}", inner.next_invitation),
            email: email.into(),
            role: role.to_string(),
            status_code: 0,
        };
        inner.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn delete_invitation(&self, invitation_id: &str) -> Result<()> {
        let mut inner = self.begin();
        if inner.fail_invitation_deletes {
            return Err(server_error());
        }
        inner.invitations.retain(|i| i.id != invitation_id);
        Ok(())
    }
}
