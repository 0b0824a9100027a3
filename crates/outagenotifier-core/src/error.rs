//! Error types for record construction, date parsing, and classification.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the core outage logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The date-range text produced a token sequence of a shape we do not know.
    #[error("unexpected number of raw date elements: {count}")]
    UnexpectedTokenCount { count: usize },

    /// A token appeared where the date-range shape does not allow it.
    #[error("unexpected date token '{token}' at position {position}")]
    InvalidToken { token: String, position: usize },

    /// The tokens were well-shaped but do not form a real local date/time.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// An outage claims an impossible temporal state.
    #[error("data integrity violation for '{title}': {reason}")]
    DataIntegrity { title: String, reason: String },
}

impl CoreError {
    /// Creates a data integrity error.
    pub fn integrity(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            title: title.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for the date-range parse failures.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedTokenCount { .. } | Self::InvalidToken { .. } | Self::InvalidDate(_)
        )
    }

    /// Returns true for impossible temporal states.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::DataIntegrity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_classified() {
        assert!(CoreError::UnexpectedTokenCount { count: 5 }.is_parse());
        assert!(CoreError::InvalidDate("Feb 30".into()).is_parse());
        assert!(!CoreError::integrity("x", "y").is_parse());
        assert!(CoreError::integrity("x", "y").is_integrity());
    }

    #[test]
    fn display_mentions_title() {
        let err = CoreError::integrity("Cluster_ maintenance", "ends before it starts");
        let display = err.to_string();
        assert!(display.contains("Cluster_ maintenance"));
        assert!(display.contains("ends before it starts"));
    }
}
