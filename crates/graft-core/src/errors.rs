//! Unified error type for graft crates
//!
//! Tracker bookkeeping never fails, so this type only covers the edges where
//! data crosses into or out of the tree-data layer: building nodes, encoding
//! them to bytes and reading them back.

use serde::{Deserialize, Serialize};

/// Unified error type for graft operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GraftError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Internal error, e.g. a bridge that could not allocate a node
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl GraftError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard Result type for graft operations
pub type Result<T> = std::result::Result<T, GraftError>;

impl From<std::io::Error> for GraftError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_produce_matching_variants() {
        assert!(matches!(
            GraftError::invalid("bad"),
            GraftError::Invalid { .. }
        ));
        assert!(matches!(
            GraftError::serialization("bad"),
            GraftError::Serialization { .. }
        ));
        assert!(matches!(
            GraftError::internal("bad"),
            GraftError::Internal { .. }
        ));
    }

    #[test]
    fn display_includes_message() {
        let err = GraftError::serialization("truncated input");
        assert_eq!(err.to_string(), "Serialization error: truncated input");
    }
}
