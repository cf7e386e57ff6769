//! CF-000: Crate error type.

use thiserror::Error;

/// Errors raised by cflab operations.
///
/// Nothing here is retried or recovered; every variant propagates to the
/// process boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("identity service call failed: {0}")]
    Identity(String),

    #[error("invalid stack definition: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
