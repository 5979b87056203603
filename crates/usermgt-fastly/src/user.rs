//! Invitation → user reconciliation
//!
//! A managed user starts life either as a pending invitation or, when the
//! person already belongs to the account, as an accepted user. Reads poll
//! for acceptance and move the identity from the invitation id to the user
//! id; deletes remove whichever object is live.

use crate::directory::AccountDirectory;
use crate::error::{FastlyError, Result};
use crate::model::{RemoteUser, Role, UserUpdate};

/// Which remote object currently backs a managed user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Invitation sent, not yet accepted
    Pending { invitation_id: String },
    /// Invitation accepted (or the user existed already)
    Active { user_id: String },
    /// Nothing remote backs this user any more
    Absent,
}

impl Identity {
    /// The id the host should track
    pub fn resource_id(&self) -> &str {
        match self {
            Identity::Pending { invitation_id } => invitation_id,
            Identity::Active { user_id } => user_id,
            Identity::Absent => "",
        }
    }

    pub fn invitation_id(&self) -> &str {
        match self {
            Identity::Pending { invitation_id } => invitation_id,
            _ => "",
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Identity::Active { user_id } => user_id,
            _ => "",
        }
    }
}

/// A user under declarative management
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedUser {
    /// Email address; the identity key across invitation and user
    pub login: String,
    pub name: String,
    pub role: Role,
    pub identity: Identity,
}

impl ManagedUser {
    /// Overwrite attributes with the authoritative remote record
    fn refresh_from(&mut self, remote: &RemoteUser) -> Result<()> {
        let role = remote.parsed_role()?;
        self.login = remote.login.clone();
        self.name = remote.name.clone();
        self.role = role;
        self.identity = Identity::Active {
            user_id: remote.id.clone(),
        };
        Ok(())
    }
}

/// Requested attribute changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none()
    }
}

/// Drives the lifecycle of managed users against an [`AccountDirectory`]
pub struct UserReconciler<D> {
    directory: D,
}

impl<D: AccountDirectory> UserReconciler<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Adopt an existing user or invitation for `login`, or send a new
    /// invitation
    pub async fn create(&self, login: &str, name: &str, role: Role) -> Result<ManagedUser> {
        let account_id = self.directory.current_account_id().await?;

        if let Some(existing) = self.directory.find_user_by_login(&account_id, login).await? {
            tracing::info!("User {} already exists as {}, adopting", login, existing.id);
            let mut user = ManagedUser {
                login: login.to_string(),
                name: name.to_string(),
                role,
                identity: Identity::Absent,
            };
            user.refresh_from(&existing)?;
            return Ok(user);
        }

        let invitation = match self.directory.find_invitation_by_email(login).await? {
            Some(invitation) => {
                tracing::debug!("Found existing invitation for {}: {}", login, invitation.id);
                invitation
            }
            None => {
                let invitation = self
                    .directory
                    .create_invitation(login, role, &account_id)
                    .await?;
                tracing::info!("Created invitation for {}: {}", login, invitation.id);
                invitation
            }
        };

        Ok(ManagedUser {
            login: login.to_string(),
            name: name.to_string(),
            role,
            identity: Identity::Pending {
                invitation_id: invitation.id,
            },
        })
    }

    /// Refresh `user` from the remote side. On error `user` is untouched.
    pub async fn read(&self, user: &mut ManagedUser) -> Result<()> {
        match user.identity.clone() {
            Identity::Active { user_id } => match self.directory.get_user(&user_id).await {
                Ok(remote) => user.refresh_from(&remote),
                Err(e) if e.is_not_found() => {
                    tracing::debug!("User {} no longer exists", user_id);
                    user.identity = Identity::Absent;
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Identity::Pending { invitation_id } => {
                // Acceptance wins over whatever the invitation still says
                let account_id = self.directory.current_account_id().await?;
                if let Some(remote) = self
                    .directory
                    .find_user_by_login(&account_id, &user.login)
                    .await?
                {
                    if remote.role != user.role.as_str() {
                        tracing::warn!(
                            "User {} accepted invitation {} with role {} (configured {})",
                            user.login,
                            invitation_id,
                            remote.role,
                            user.role
                        );
                    }
                    user.refresh_from(&remote)?;
                    tracing::info!(
                        "User {} accepted invitation, transitioning to user_id {}",
                        user.login,
                        remote.id
                    );
                    return Ok(());
                }

                match self.directory.get_invitation(&invitation_id).await {
                    Ok(invitation) => {
                        tracing::debug!(
                            "Invitation {} still pending for {} (status_code: {})",
                            invitation_id,
                            user.login,
                            invitation.status_code
                        );
                        Ok(())
                    }
                    Err(e) if e.is_not_found() => {
                        tracing::debug!(
                            "Invitation {} no longer exists, will recreate on next apply",
                            invitation_id
                        );
                        user.identity = Identity::Absent;
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Identity::Absent => Ok(()),
        }
    }

    /// Apply name/role changes. Only an accepted user can be modified.
    pub async fn update(&self, user: &mut ManagedUser, changes: UserChanges) -> Result<()> {
        let user_id = match &user.identity {
            Identity::Active { .. } | Identity::Pending { .. } if changes.is_empty() => {
                return Ok(());
            }
            Identity::Active { user_id } => user_id.clone(),
            Identity::Pending { .. } => {
                return Err(FastlyError::Precondition(
                    "cannot update user while invitation is still pending; \
                     please wait for the user to accept the invitation"
                        .to_string(),
                ));
            }
            Identity::Absent => {
                return Err(FastlyError::Precondition(format!(
                    "cannot update {}: user no longer exists",
                    user.login
                )));
            }
        };

        let update = UserUpdate {
            name: changes.name,
            role: changes.role,
        };
        self.directory.update_user(&user_id, &update).await?;
        tracing::info!("Updated user {} ({})", user.login, user_id);

        let remote = self.directory.get_user(&user_id).await?;
        user.refresh_from(&remote)
    }

    /// Remove whatever backs `user`. Teardown of a pending invitation never
    /// fails.
    pub async fn delete(&self, user: &ManagedUser) -> Result<()> {
        match &user.identity {
            Identity::Active { user_id } => match self.directory.delete_user(user_id).await {
                Ok(()) => {
                    tracing::info!("Deleted user {} ({})", user.login, user_id);
                    Ok(())
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!("User {} already gone", user_id);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Identity::Pending { invitation_id } => {
                match self.directory.delete_invitation(invitation_id).await {
                    Ok(()) => tracing::info!("Deleted invitation {} for {}", invitation_id, user.login),
                    Err(e) => tracing::warn!(
                        "Error deleting invitation {} (may have already expired): {}",
                        invitation_id,
                        e
                    ),
                }
                Ok(())
            }
            Identity::Absent => Ok(()),
        }
    }

    /// Resolve an existing remote id into a managed user: a user id first,
    /// then a pending invitation id. Unknown ids come back `Absent`.
    pub async fn import(&self, id: &str) -> Result<ManagedUser> {
        let mut user = ManagedUser {
            login: String::new(),
            name: String::new(),
            role: Role::default(),
            identity: Identity::Absent,
        };

        match self.directory.get_user(id).await {
            Ok(remote) => {
                user.refresh_from(&remote)?;
                return Ok(user);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        match self.directory.get_invitation(id).await {
            Ok(invitation) => {
                user.role = invitation.role.parse().unwrap_or_default();
                user.login = invitation.email;
                user.identity = Identity::Pending {
                    invitation_id: invitation.id,
                };
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("Nothing to import for {}", id);
            }
            Err(e) => return Err(e),
        }
        Ok(user)
    }
}
