//! Server error types.

use std::io;
use std::path::PathBuf;

use outagenotifier_core::CoreError;
use outagenotifier_providers::ProviderError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while running a poll cycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (snapshot file, working directory).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Fetch or normalization failure.
    #[error("Feed error: {0}")]
    Provider(#[from] ProviderError),

    /// Classification failure, always a data integrity problem.
    #[error("Classification error: {0}")]
    Core(#[from] CoreError),

    /// Snapshot could not be encoded or decoded.
    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No snapshot has been accepted yet.
    #[error("No outage snapshot at {path}; run `outagenotifier refresh` first")]
    MissingSnapshot { path: PathBuf },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a missing snapshot error.
    pub fn missing_snapshot(path: impl Into<PathBuf>) -> Self {
        Self::MissingSnapshot { path: path.into() }
    }

    /// Returns true if the feed could not be retrieved. Such errors heal on
    /// the next tick and are not announced.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_fetch_error())
    }
}
