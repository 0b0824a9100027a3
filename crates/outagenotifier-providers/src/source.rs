//! The [`FeedSource`] trait: where raw feed content comes from.

use std::future::Future;
use std::pin::Pin;

use crate::client::FeedClient;
use crate::error::{ProviderError, ProviderResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can hand out the current raw feed body.
///
/// [`FeedClient`] is the production implementation; tests substitute
/// in-memory sources.
pub trait FeedSource: Send + Sync {
    /// Short description for logs, usually the feed URL.
    fn name(&self) -> &str;

    /// Retrieves the current feed body.
    ///
    /// # Errors
    ///
    /// Returns a fetch-class [`ProviderError`] when the feed is unreachable.
    fn fetch(&self) -> BoxFuture<'_, ProviderResult<String>>;
}

impl FeedSource for FeedClient {
    fn name(&self) -> &str {
        self.url().as_str()
    }

    fn fetch(&self) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(FeedClient::fetch(self))
    }
}

/// A source that always fails with the same error.
#[derive(Debug)]
pub struct ErrorSource {
    name: String,
    error: ProviderError,
}

impl ErrorSource {
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl FeedSource for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, ProviderResult<String>> {
        // ProviderError is not Clone; rebuild it from its parts.
        let error = ProviderError::new(self.error.code(), self.error.message());
        Box::pin(async move { Err(error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[tokio::test]
    async fn error_source_always_fails() {
        let source = ErrorSource::new("offline", ProviderError::network("unreachable"));
        assert_eq!(source.name(), "offline");
        for _ in 0..2 {
            let err = source.fetch().await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::NetworkError);
            assert_eq!(err.message(), "unreachable");
        }
    }
}
