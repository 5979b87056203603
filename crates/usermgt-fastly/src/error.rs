//! Fastly provider error types

use thiserror::Error;
use usermgt_cloud::CloudError;

#[derive(Error, Debug)]
pub enum FastlyError {
    #[error("API returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Precondition(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("no API key configured (set FASTLY_API_KEY or api_key in usermgt.yaml)")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FastlyError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FastlyError::NotFound(_))
    }
}

impl From<reqwest::Error> for FastlyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FastlyError::Timeout(err.to_string())
        } else {
            FastlyError::Http(err)
        }
    }
}

impl From<FastlyError> for CloudError {
    fn from(err: FastlyError) -> Self {
        match err {
            FastlyError::NotFound(what) => CloudError::ResourceNotFound(what),
            FastlyError::Precondition(msg) => CloudError::Precondition(msg),
            FastlyError::Timeout(msg) => CloudError::Timeout(msg),
            FastlyError::MissingApiKey => CloudError::InvalidConfig(err.to_string()),
            FastlyError::InvalidConfig(msg) => CloudError::InvalidConfig(msg),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, FastlyError>;
