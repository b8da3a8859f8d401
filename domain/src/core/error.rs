//! Domain error types

use thiserror::Error;

/// Longest query text the agent service accepts, in characters.
pub const MAX_QUERY_CHARS: usize = 2000;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Query is too long: {actual} characters (maximum {max})")]
    QueryTooLong { max: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_display() {
        let error = DomainError::EmptyQuery;
        assert_eq!(error.to_string(), "Query cannot be empty");
    }

    #[test]
    fn test_query_too_long_display() {
        let error = DomainError::QueryTooLong {
            max: MAX_QUERY_CHARS,
            actual: 2001,
        };
        assert_eq!(
            error.to_string(),
            "Query is too long: 2001 characters (maximum 2000)"
        );
    }
}
