//! Query value object

use serde::{Deserialize, Serialize};

use super::error::{DomainError, MAX_QUERY_CHARS};

/// A question to pose to the support agent (Value Object)
///
/// Carries the question text together with the caller's choice of whether
/// the answer should name its source documents. Immutable once constructed;
/// the bounds mirror what the service enforces on its side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    text: String,
    include_sources: bool,
}

impl Query {
    /// Create a new query without source attribution
    ///
    /// Rejects blank text and text over [`MAX_QUERY_CHARS`] characters.
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyQuery);
        }
        let chars = text.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(DomainError::QueryTooLong {
                max: MAX_QUERY_CHARS,
                actual: chars,
            });
        }
        Ok(Self {
            text,
            include_sources: false,
        })
    }

    /// Toggle source attribution in the answer
    pub fn with_sources(mut self, include_sources: bool) -> Self {
        self.include_sources = include_sources;
        self
    }

    /// Get the question text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the answer should list its source documents
    pub fn include_sources(&self) -> bool {
        self.include_sources
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = Query::new("What is Amazon S3?").unwrap();
        assert_eq!(q.text(), "What is Amazon S3?");
        assert!(!q.include_sources());
    }

    #[test]
    fn test_with_sources() {
        let q = Query::new("What is Amazon S3?").unwrap().with_sources(true);
        assert!(q.include_sources());
    }

    #[test]
    fn test_empty_query_rejected() {
        assert_eq!(Query::new(""), Err(DomainError::EmptyQuery));
        assert_eq!(Query::new("   "), Err(DomainError::EmptyQuery));
    }

    #[test]
    fn test_max_length_boundary() {
        let at_limit = "a".repeat(MAX_QUERY_CHARS);
        assert!(Query::new(at_limit).is_ok());

        let over_limit = "a".repeat(MAX_QUERY_CHARS + 1);
        assert_eq!(
            Query::new(over_limit),
            Err(DomainError::QueryTooLong {
                max: MAX_QUERY_CHARS,
                actual: MAX_QUERY_CHARS + 1,
            })
        );
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let multibyte = "あ".repeat(MAX_QUERY_CHARS);
        assert!(Query::new(multibyte).is_ok());
    }
}
