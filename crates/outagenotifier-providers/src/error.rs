//! Error types for feed retrieval and normalization.

use std::fmt;

use outagenotifier_core::CoreError;
use thiserror::Error;

/// The category of a feed error.
///
/// The poll cycle uses it to tell self-healing fetch failures apart from
/// the loud ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Connection failed, timed out, DNS resolution, etc.
    NetworkError,
    /// The feed server answered with a 5xx status.
    ServerError,
    /// The feed URL answered 404 or another client error.
    NotFound,
    /// The cached feed could not be parsed or a date range was malformed.
    InvalidResponse,
    /// The raw feed cache file is absent.
    MissingFile,
    /// An entry describes an impossible temporal state.
    DataIntegrity,
    /// Reading or writing the raw cache failed.
    Io,
    /// Missing or invalid feed configuration.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Returns true for failures while retrieving the feed. These abandon the
    /// cycle but leave every cached file untouched, so the next tick retries.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::ServerError | Self::NotFound
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::ServerError => "server_error",
            Self::NotFound => "not_found",
            Self::InvalidResponse => "invalid_response",
            Self::MissingFile => "missing_file",
            Self::DataIntegrity => "data_integrity",
            Self::Io => "io_error",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while fetching or normalizing a feed.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The feed format being processed ("ical", "rss").
    feed: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            feed: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn missing_file(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::MissingFile, message)
    }

    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::DataIntegrity, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Io, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Sets the feed format for this error.
    pub fn with_feed(mut self, feed: impl Into<String>) -> Self {
        self.feed = Some(feed.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn feed(&self) -> Option<&str> {
        self.feed.as_deref()
    }

    /// Returns true if the feed could not be retrieved.
    pub fn is_fetch_error(&self) -> bool {
        self.code.is_fetch_error()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref feed) = self.feed {
            write!(f, "[{}] ", feed)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<CoreError> for ProviderError {
    fn from(err: CoreError) -> Self {
        let base = if err.is_integrity() {
            Self::data_integrity(err.to_string())
        } else {
            Self::invalid_response(err.to_string())
        };
        base.with_source(err)
    }
}

/// A specialized Result type for feed operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
