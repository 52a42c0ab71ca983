//! Tree-data bridge
//!
//! The protocol's data model is a generic tree of lists, maps and scalars.
//! Everything in graft that builds or parses such trees goes through
//! [`IpldBridge`], so the codec can be exercised against an in-memory fake as
//! well as the production DAG-CBOR bridge.
//!
//! Reading a decoded tree is done with [`SimpleNode`](crate::node::SimpleNode),
//! which needs no bridge state.

use crate::errors::Result;
use crate::identifiers::Link;
use ipld_core::ipld::Ipld;

/// Capability set for building, encoding and decoding tree values
pub trait IpldBridge: Send + Sync {
    /// Build a list value from ordered elements
    fn build_list(&self, items: Vec<Ipld>) -> Result<Ipld>;

    /// Build a map value from entries in insertion order
    ///
    /// Duplicate keys are rejected.
    fn build_map(&self, entries: Vec<(&str, Ipld)>) -> Result<Ipld>;

    /// Build a link value
    fn build_link(&self, link: &Link) -> Result<Ipld>;

    /// Build a boolean value
    fn build_bool(&self, value: bool) -> Result<Ipld>;

    /// Serialize a value to bytes
    fn encode_node(&self, node: &Ipld) -> Result<Vec<u8>>;

    /// Deserialize bytes into a generic value
    fn decode_node(&self, encoded: &[u8]) -> Result<Ipld>;
}
