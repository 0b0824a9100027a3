//! Client error types.

use std::io;

use outagenotifier_core::{CoreError, TracingError};
use outagenotifier_providers::ProviderError;
use outagenotifier_server::ServerError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Feed setup or fetch error.
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Classification error.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Poll cycle error.
    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("logging setup failed: {0}")]
    Tracing(#[from] TracingError),
}

impl ClientError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
