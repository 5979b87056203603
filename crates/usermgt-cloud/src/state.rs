//! Resource property bags and their persistence
//!
//! Manages the `.usermgt/state.json` file which records the last known
//! property bag of every resource the host manages.

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".usermgt";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const STATE_STAGING: &str = "state.json.tmp";
const LOCK_FILE: &str = "lock.json";
/// Age after which a lock is considered abandoned
pub const LOCK_TTL_MINUTES: i64 = 60;

/// Global state containing every managed resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Resources indexed by type:name
    pub resources: HashMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: HashMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the key a resource is stored under
    pub fn key(resource_type: &str, name: &str) -> String {
        format!("{}:{}", resource_type, name)
    }

    /// Get resources of a specific type, sorted by key
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(&String, &ResourceState)> {
        let prefix = format!("{}:", resource_type);
        let mut found: Vec<_> = self
            .resources
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        found
    }

    /// Add or update a resource
    pub fn set_resource(&mut self, key: String, state: ResourceState) {
        self.resources.insert(key, state);
        self.updated_at = Utc::now();
    }

    /// Remove a resource
    pub fn remove_resource(&mut self, key: &str) -> Option<ResourceState> {
        let result = self.resources.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    /// Get a resource by key
    pub fn get_resource(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }
}

/// Property bag of a single resource
///
/// `id` is the opaque identifier the host tracks; `attributes` holds the
/// schema fields, both configured and computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-specific resource ID, empty when the resource is gone
    pub id: String,

    /// Resource type
    pub resource_type: String,

    /// Current status
    pub status: ResourceStatus,

    /// Schema attributes (login, name, role, ...)
    pub attributes: HashMap<String, serde_json::Value>,

    /// When the bag was created
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(resource_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            resource_type: resource_type.into(),
            status: ResourceStatus::Unknown,
            attributes: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.updated_at = Utc::now();
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
        self.updated_at = Utc::now();
    }

    /// String attribute, empty when unset
    pub fn get_str(&self, key: &str) -> &str {
        self.attributes
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }

    /// Whether `key` differs between `self` and `other`
    pub fn has_change(&self, other: &ResourceState, key: &str) -> bool {
        self.attributes.get(key) != other.attributes.get(key)
    }

    /// Whether the host should consider the resource deleted
    pub fn is_gone(&self) -> bool {
        self.id.is_empty()
    }
}

/// Status of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Waiting on an out-of-band step (e.g. an invitation)
    Pending,
    /// Backed by a live remote object
    Active,
    /// Remote object no longer exists
    Absent,
    /// Status is unknown
    Unknown,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Pending => write!(f, "pending"),
            ResourceStatus::Active => write!(f, "active"),
            ResourceStatus::Absent => write!(f, "absent"),
            ResourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Reads and writes `.usermgt/state.json` under a project directory
pub struct StateManager {
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.project_root.join(STATE_DIR).join(file)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.project_root.join(STATE_DIR);
        if !dir.is_dir() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the recorded property bags. A missing or empty file is an empty
    /// state.
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.path(STATE_FILE);
        if !path.exists() {
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        if content.trim().is_empty() {
            tracing::warn!("{} is empty, starting from no managed users", path.display());
            return Ok(GlobalState::new());
        }

        let state: GlobalState = serde_json::from_str(&content).map_err(|e| {
            CloudError::StateError(format!(
                "{} is corrupt ({}); restore it from {}",
                path.display(),
                e,
                STATE_BACKUP
            ))
        })?;
        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded {} managed resources", state.resources.len());
        Ok(state)
    }

    /// Write the state through a temporary file so an interrupted save
    /// never leaves a truncated `state.json`. The previous file is copied to
    /// the backup first.
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.path(STATE_FILE);
        if path.exists() {
            fs::copy(&path, self.path(STATE_BACKUP)).await?;
        }

        let staging = self.path(STATE_STAGING);
        fs::write(&staging, serde_json::to_string_pretty(state)?).await?;
        fs::rename(&staging, &path).await?;

        tracing::debug!("Saved {} managed resources", state.resources.len());
        Ok(())
    }

    /// Take the project lock on behalf of `operation` (e.g. `user create
    /// alice`). Another live holder fails with `LockError`; a lock older
    /// than [`LOCK_TTL_MINUTES`] or one that cannot be parsed is taken over.
    pub async fn acquire_lock(&self, operation: &str) -> Result<StateLock> {
        self.ensure_state_dir().await?;
        let lock_path = self.path(LOCK_FILE);

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            match serde_json::from_str::<LockInfo>(&content) {
                Ok(holder) => {
                    let age = Utc::now().signed_duration_since(holder.acquired_at);
                    if age.num_minutes() < LOCK_TTL_MINUTES {
                        return Err(CloudError::LockError(format!(
                            "`{}` (pid {} on {}) has held the state lock since {}",
                            holder.operation, holder.pid, holder.host, holder.acquired_at
                        )));
                    }
                    tracing::warn!(
                        "Taking over stale lock left by `{}` (pid {})",
                        holder.operation,
                        holder.pid
                    );
                }
                Err(e) => tracing::warn!("Ignoring unreadable lock file: {}", e),
            }
        }

        let info = LockInfo {
            operation: operation.to_string(),
            pid: std::process::id(),
            host: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };
        fs::write(&lock_path, serde_json::to_string_pretty(&info)?).await?;

        tracing::debug!("Acquired state lock for `{}`", operation);
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

/// Contents of `lock.json`
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    operation: String,
    pid: u32,
    host: String,
    acquired_at: DateTime<Utc>,
}

/// Held project lock; removed on `release` or drop
#[derive(Debug)]
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        match fs::remove_file(&self.lock_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
