//! Graft Core - shared foundation for graph-sync responders
//!
//! This crate holds the types every other graft crate agrees on:
//!
//! - [`Link`] and [`RequestId`] identifiers
//! - [`GraftError`], the unified error type
//! - DAG-CBOR [`serialization`] helpers (the canonical wire format)
//! - the [`IpldBridge`] capability trait for building and encoding tree values
//! - [`SimpleNode`], a checked reader over decoded tree values
//!
//! It performs no I/O and holds no state.

#![forbid(unsafe_code)]

/// Tree-data bridge trait
pub mod bridge;

/// Unified error handling
pub mod errors;

/// Link and request identifiers
pub mod identifiers;

/// Checked tree value reader
pub mod node;

/// DAG-CBOR serialization (canonical format)
pub mod serialization;

pub use bridge::IpldBridge;
pub use errors::{GraftError, Result};
pub use identifiers::{Link, RequestId, BLAKE3_MULTIHASH_CODE, DAG_CBOR_CODEC, RAW_CODEC};
pub use node::{NodeError, NodeKind, SimpleNode};

/// Re-export of the generic tree value type
pub use ipld_core::ipld::Ipld;
