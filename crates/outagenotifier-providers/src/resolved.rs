//! Detection of the manual "resolved" marker in event descriptions.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ProviderError, ProviderResult};

/// The marker editors paste into a description when closing an outage.
pub const DEFAULT_RESOLVED_MARKER: &str = "52fd10b1ca2d496af32163f088d8ec96";

static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_RESOLVED_MARKER).expect("Invalid resolved marker regex"));

/// Case-sensitive, literal search for the resolved marker.
#[derive(Debug, Clone)]
pub struct ResolvedMarker {
    marker: String,
    pattern: Regex,
}

impl Default for ResolvedMarker {
    fn default() -> Self {
        Self {
            marker: DEFAULT_RESOLVED_MARKER.to_string(),
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

impl ResolvedMarker {
    /// Builds a matcher for `marker`. Regex metacharacters match literally.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the marker is empty.
    pub fn new(marker: impl Into<String>) -> ProviderResult<Self> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(ProviderError::configuration("resolved marker must not be empty"));
        }
        let pattern = Regex::new(&regex::escape(&marker))
            .map_err(|e| ProviderError::configuration("invalid resolved marker").with_source(e))?;
        Ok(Self { marker, pattern })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns true if `description` contains the marker anywhere.
    pub fn is_resolved(&self, description: &str) -> bool {
        self.pattern.is_match(description)
    }
}
