//! `fastly_user` resource
//!
//! Maps the host's property bag to a [`ManagedUser`] on the way in and
//! back on the way out. Schema:
//!
//! | attribute       | kind                              |
//! |-----------------|-----------------------------------|
//! | `login`         | string, required, forces new      |
//! | `name`          | string, required                  |
//! | `role`          | `user` (default), `billing`, `engineer`, `superuser` |
//! | `invitation_id` | computed                          |
//! | `user_id`       | computed                          |

use crate::directory::AccountDirectory;
use crate::error::FastlyError;
use crate::model::Role;
use crate::user::{Identity, ManagedUser, UserChanges, UserReconciler};
use async_trait::async_trait;
use serde_json::json;
use usermgt_cloud::{CloudError, ManagedResource, ResourceState, ResourceStatus};

pub const USER_RESOURCE_TYPE: &str = "fastly_user";

/// Read a managed user out of a property bag
pub fn user_from_state(data: &ResourceState) -> Result<ManagedUser, FastlyError> {
    let role = match data.get_str("role") {
        "" => Role::default(),
        role => role.parse()?,
    };

    let identity = match (data.get_str("user_id"), data.get_str("invitation_id")) {
        (user_id, _) if !user_id.is_empty() => Identity::Active {
            user_id: user_id.to_string(),
        },
        (_, invitation_id) if !invitation_id.is_empty() => Identity::Pending {
            invitation_id: invitation_id.to_string(),
        },
        _ => Identity::Absent,
    };

    Ok(ManagedUser {
        login: data.get_str("login").to_string(),
        name: data.get_str("name").to_string(),
        role,
        identity,
    })
}

/// Write a managed user back into a property bag
pub fn write_user(user: &ManagedUser, data: &mut ResourceState) {
    data.set_id(user.identity.resource_id());
    data.status = match user.identity {
        Identity::Pending { .. } => ResourceStatus::Pending,
        Identity::Active { .. } => ResourceStatus::Active,
        Identity::Absent => ResourceStatus::Absent,
    };
    data.set_attribute("login", json!(user.login));
    data.set_attribute("name", json!(user.name));
    data.set_attribute("role", json!(user.role.as_str()));
    data.set_attribute("invitation_id", json!(user.identity.invitation_id()));
    data.set_attribute("user_id", json!(user.identity.user_id()));
}

fn require(data: &ResourceState, key: &str) -> Result<(), CloudError> {
    if data.get_str(key).is_empty() {
        return Err(CloudError::InvalidConfig(format!(
            "{} is required for {}",
            key, USER_RESOURCE_TYPE
        )));
    }
    Ok(())
}

/// Declarative resource backed by [`UserReconciler`]
pub struct UserResource<D> {
    reconciler: UserReconciler<D>,
}

impl<D: AccountDirectory> UserResource<D> {
    pub fn new(directory: D) -> Self {
        Self {
            reconciler: UserReconciler::new(directory),
        }
    }

    pub fn reconciler(&self) -> &UserReconciler<D> {
        &self.reconciler
    }
}

#[async_trait]
impl<D: AccountDirectory> ManagedResource for UserResource<D> {
    fn type_name(&self) -> &str {
        USER_RESOURCE_TYPE
    }

    async fn create(&self, data: &mut ResourceState) -> usermgt_cloud::Result<()> {
        require(data, "login")?;
        require(data, "name")?;
        let desired = user_from_state(data)?;

        let user = self
            .reconciler
            .create(&desired.login, &desired.name, desired.role)
            .await?;
        write_user(&user, data);
        Ok(())
    }

    async fn read(&self, data: &mut ResourceState) -> usermgt_cloud::Result<()> {
        tracing::debug!("Refreshing {} ({})", USER_RESOURCE_TYPE, data.id);
        let mut user = user_from_state(data)?;

        // A bare id with no computed attributes comes from import passthrough
        if user.identity == Identity::Absent && !data.id.is_empty() {
            let imported = self.reconciler.import(&data.id).await?;
            if imported.name.is_empty() {
                // Invitations carry no name; keep the configured one
                user = ManagedUser {
                    name: user.name,
                    ..imported
                };
            } else {
                user = imported;
            }
        } else {
            self.reconciler.read(&mut user).await?;
        }

        write_user(&user, data);
        Ok(())
    }

    async fn update(
        &self,
        prior: &ResourceState,
        data: &mut ResourceState,
    ) -> usermgt_cloud::Result<()> {
        if prior.has_change(data, "login") {
            return Err(CloudError::Precondition(
                "login cannot be changed in place; the user must be replaced".to_string(),
            ));
        }

        let planned = user_from_state(data)?;
        let mut user = user_from_state(prior)?;
        let changes = UserChanges {
            name: prior
                .has_change(data, "name")
                .then(|| planned.name.clone()),
            role: prior.has_change(data, "role").then_some(planned.role),
        };

        self.reconciler.update(&mut user, changes).await?;
        write_user(&user, data);
        Ok(())
    }

    async fn delete(&self, data: &ResourceState) -> usermgt_cloud::Result<()> {
        let user = user_from_state(data)?;
        self.reconciler.delete(&user).await?;
        Ok(())
    }

    async fn import(&self, id: &str) -> usermgt_cloud::Result<ResourceState> {
        let user = self.reconciler.import(id).await?;
        if user.identity == Identity::Absent {
            return Err(CloudError::ResourceNotFound(format!(
                "no user or invitation with id {}",
                id
            )));
        }

        let mut data = ResourceState::new(USER_RESOURCE_TYPE);
        write_user(&user, &mut data);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryDirectory;

    fn config(login: &str, name: &str, role: &str) -> ResourceState {
        ResourceState::new(USER_RESOURCE_TYPE)
            .with_attribute("login", json!(login))
            .with_attribute("name", json!(name))
            .with_attribute("role", json!(role))
    }

    #[test]
    fn test_user_from_state_defaults_role() {
        let data = ResourceState::new(USER_RESOURCE_TYPE)
            .with_attribute("login", json!("a@x.com"))
            .with_attribute("name", json!("Alice"));

        let user = user_from_state(&data).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.identity, Identity::Absent);
    }

    #[test]
    fn test_user_from_state_rejects_unknown_role() {
        let err = user_from_state(&config("a@x.com", "Alice", "admin")).unwrap_err();
        assert!(matches!(err, FastlyError::InvalidConfig(_)));
    }

    #[test]
    fn test_user_id_takes_precedence_over_invitation_id() {
        let data = config("a@x.com", "Alice", "user")
            .with_attribute("user_id", json!("u-1"))
            .with_attribute("invitation_id", json!("inv-1"));

        let user = user_from_state(&data).unwrap();
        assert_eq!(user.identity, Identity::Active { user_id: "u-1".into() });
    }

    #[tokio::test]
    async fn test_create_then_accept_through_property_bag() {
        let resource = UserResource::new(MemoryDirectory::new());
        let mut data = config("a@x.com", "Alice", "engineer");

        resource.create(&mut data).await.unwrap();
        assert_eq!(data.id, "inv-1");
        assert_eq!(data.status, ResourceStatus::Pending);
        assert_eq!(data.get_str("invitation_id"), "inv-1");
        assert_eq!(data.get_str("user_id"), "");

        resource
            .reconciler()
            .directory()
            .add_user("u-1", "a@x.com", "Alice", "engineer");
        resource.read(&mut data).await.unwrap();

        assert_eq!(data.id, "u-1");
        assert_eq!(data.status, ResourceStatus::Active);
        assert_eq!(data.get_str("invitation_id"), "");
        assert_eq!(data.get_str("user_id"), "u-1");
    }

    #[tokio::test]
    async fn test_create_requires_login_and_name() {
        let resource = UserResource::new(MemoryDirectory::new());
        let mut data = config("a@x.com", "", "user");

        let err = resource.create(&mut data).await.unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(_)));
        assert_eq!(resource.reconciler().directory().calls(), 0);
    }

    #[tokio::test]
    async fn test_read_gone_clears_id() {
        let resource = UserResource::new(MemoryDirectory::new());
        let mut data = config("a@x.com", "Alice", "user")
            .with_id("inv-2")
            .with_attribute("invitation_id", json!("inv-2"));

        resource.read(&mut data).await.unwrap();

        assert!(data.is_gone());
        assert_eq!(data.status, ResourceStatus::Absent);
    }

    #[tokio::test]
    async fn test_read_import_passthrough() {
        let directory = MemoryDirectory::new();
        directory.add_user("u-5", "e@x.com", "Eve", "billing");
        let resource = UserResource::new(directory);

        let mut data = ResourceState::new(USER_RESOURCE_TYPE).with_id("u-5");
        resource.read(&mut data).await.unwrap();

        assert_eq!(data.get_str("user_id"), "u-5");
        assert_eq!(data.get_str("login"), "e@x.com");
        assert_eq!(data.get_str("role"), "billing");
    }

    #[tokio::test]
    async fn test_update_pending_role_fails() {
        let resource = UserResource::new(MemoryDirectory::new());
        let prior = config("a@x.com", "Alice", "user")
            .with_id("inv-1")
            .with_attribute("invitation_id", json!("inv-1"));
        let mut planned = prior.clone().with_attribute("role", json!("billing"));

        let err = resource.update(&prior, &mut planned).await.unwrap_err();

        assert!(matches!(err, CloudError::Precondition(_)));
        assert_eq!(resource.reconciler().directory().calls(), 0);
    }

    #[tokio::test]
    async fn test_update_active_name() {
        let directory = MemoryDirectory::new();
        directory.add_user("u-1", "a@x.com", "Alice", "user");
        let resource = UserResource::new(directory);
        let prior = config("a@x.com", "Alice", "user")
            .with_id("u-1")
            .with_attribute("user_id", json!("u-1"));
        let mut planned = prior.clone().with_attribute("name", json!("Alicia"));

        resource.update(&prior, &mut planned).await.unwrap();

        assert_eq!(planned.get_str("name"), "Alicia");
        let stored = resource.reconciler().directory().user("u-1").unwrap();
        assert_eq!(stored.name, "Alicia");
        assert_eq!(stored.role, "user");
    }

    #[tokio::test]
    async fn test_update_login_change_rejected() {
        let resource = UserResource::new(MemoryDirectory::new());
        let prior = config("a@x.com", "Alice", "user").with_attribute("user_id", json!("u-1"));
        let mut planned = prior.clone().with_attribute("login", json!("z@x.com"));

        let err = resource.update(&prior, &mut planned).await.unwrap_err();
        assert!(matches!(err, CloudError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_import_unknown_id() {
        let resource = UserResource::new(MemoryDirectory::new());

        let err = resource.import("nope").await.unwrap_err();
        assert!(matches!(err, CloudError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_pending_always_succeeds() {
        let directory = MemoryDirectory::new();
        directory.fail_invitation_deletes();
        let resource = UserResource::new(directory);
        let data = config("a@x.com", "Alice", "user").with_attribute("invitation_id", json!("inv-1"));

        resource.delete(&data).await.unwrap();
    }
}
