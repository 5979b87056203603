pub mod config;
pub mod invitations;
pub mod user;
pub mod users;
pub mod whoami;

use colored::{ColoredString, Colorize};
use usermgt_cloud::ResourceStatus;

pub(crate) fn status_colored(status: ResourceStatus) -> ColoredString {
    match status {
        ResourceStatus::Active => status.to_string().green(),
        ResourceStatus::Pending => status.to_string().yellow(),
        ResourceStatus::Absent => status.to_string().red(),
        ResourceStatus::Unknown => status.to_string().dimmed(),
    }
}

/// Render a JSON value as a table cell
pub(crate) fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(s) if s.is_empty() => "-".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
