//! Error types for player identity resolution

use crate::types::{MatchStrategy, Provider};
use thiserror::Error;

/// Result type for identity resolution operations
pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Bulk database for {provider} is empty or unavailable")]
    MissingBulkDatabase { provider: Provider },

    #[error("Malformed {provider} record: {reason}")]
    MalformedRecord { provider: Provider, reason: String },

    #[error("Strategy {strategy} failed: {message}")]
    Strategy { strategy: MatchStrategy, message: String },

    #[error("Could not build cross-reference index for {provider}: {message}")]
    IndexBuild { provider: Provider, message: String },

    #[error("Unexpected {provider} payload: {message}")]
    InvalidPayload { provider: Provider, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl IdentityError {
    pub fn malformed(provider: Provider, reason: impl Into<String>) -> Self {
        IdentityError::MalformedRecord { provider, reason: reason.into() }
    }

    pub fn payload(provider: Provider, message: impl Into<String>) -> Self {
        IdentityError::InvalidPayload { provider, message: message.into() }
    }
}
