//! Fastly provider for usermgt
//!
//! Manages account members declaratively. A `fastly_user` resource is
//! backed by a pending invitation until the invitee accepts, after which
//! it is backed by the user record; reads detect the acceptance and move
//! the resource id over.
//!
//! # Requirements
//!
//! - `FASTLY_API_KEY` (or `api_key` in `usermgt.yaml`)
//!
//! # Example
//!
//! ```ignore
//! use usermgt_cloud::{ManagedResource, ResourceState};
//! use usermgt_config::ProviderConfig;
//! use usermgt_fastly::FastlyProvider;
//!
//! let provider = FastlyProvider::new(&ProviderConfig::load()?)?;
//! let users = provider.user_resource();
//!
//! let mut data = ResourceState::new("fastly_user")
//!     .with_attribute("login", "a@example.com".into())
//!     .with_attribute("name", "Alice".into())
//!     .with_attribute("role", "engineer".into());
//! users.create(&mut data).await?;   // id = invitation id
//!
//! // later, after the invitation is accepted
//! users.read(&mut data).await?;     // id = user id
//! ```

pub mod client;
pub mod data_sources;
pub mod directory;
pub mod error;
pub mod model;
pub mod provider;
pub mod resource;
pub mod user;

#[cfg(test)]
mod testing;

pub use client::FastlyClient;
pub use data_sources::{InvitationsDataSource, UsersDataSource};
pub use directory::AccountDirectory;
pub use error::{FastlyError, Result};
pub use model::{Invitation, RemoteUser, Role, UserUpdate};
pub use provider::FastlyProvider;
pub use resource::{USER_RESOURCE_TYPE, UserResource};
pub use user::{Identity, ManagedUser, UserChanges, UserReconciler};
