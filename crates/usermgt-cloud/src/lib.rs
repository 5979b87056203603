//! usermgt host boundary
//!
//! This crate defines the contract between a declarative host (the
//! `usermgt` CLI, or any other driver) and the resources it manages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  usermgt CLI                     │
//! │        (user create/read/update/delete)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                usermgt-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   trait ManagedResource / DataSource      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ResourceState │  │  State Mgmt  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │ usermgt-fastly│
//!           └───────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod state;

// Re-exports
pub use error::{CloudError, Result};
pub use provider::{AuthStatus, DataSource, DataSourceState, ManagedResource};
pub use state::{
    GlobalState, LOCK_TTL_MINUTES, ResourceState, ResourceStatus, StateLock, StateManager,
};
