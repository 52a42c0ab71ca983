//! DAG-CBOR serialization for graft types
//!
//! DAG-CBOR is the canonical wire encoding: map keys are sorted, lengths are
//! definite and links are written as tag 42, so the same value always encodes
//! to the same bytes.

use crate::errors::GraftError;
use serde::{de::DeserializeOwned, Serialize};

/// Error type for serialization operations
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// DAG-CBOR encoding/decoding error
    #[error("DAG-CBOR error: {0}")]
    DagCbor(String),

    /// Invalid data format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Standard Result type for serialization operations
pub type Result<T> = std::result::Result<T, SerializationError>;

impl From<SerializationError> for GraftError {
    fn from(err: SerializationError) -> Self {
        GraftError::serialization(err.to_string())
    }
}

/// Serialize any serde-compatible type to DAG-CBOR bytes
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_ipld_dagcbor::to_vec(value).map_err(|e| {
        SerializationError::InvalidFormat(format!("Failed to serialize to DAG-CBOR: {e}"))
    })
}

/// Deserialize DAG-CBOR bytes to any serde-compatible type
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_ipld_dagcbor::from_slice(bytes).map_err(|e| SerializationError::DagCbor(e.to_string()))
}
