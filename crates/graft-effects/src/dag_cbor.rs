//! DAG-CBOR tree-data bridge
//!
//! Builds plain [`Ipld`] values in memory and encodes them with the canonical
//! DAG-CBOR serializer from `graft-core`.

use graft_core::serialization;
use graft_core::{GraftError, IpldBridge, Link, Result};
use ipld_core::ipld::Ipld;
use std::collections::BTreeMap;

/// Bridge that encodes tree values as canonical DAG-CBOR
#[derive(Debug, Clone, Copy, Default)]
pub struct DagCborBridge;

impl DagCborBridge {
    /// Create a new DAG-CBOR bridge
    pub fn new() -> Self {
        Self
    }
}

impl IpldBridge for DagCborBridge {
    fn build_list(&self, items: Vec<Ipld>) -> Result<Ipld> {
        Ok(Ipld::List(items))
    }

    fn build_map(&self, entries: Vec<(&str, Ipld)>) -> Result<Ipld> {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            if map.insert(key.to_string(), value).is_some() {
                return Err(GraftError::invalid(format!("duplicate map key `{key}`")));
            }
        }
        Ok(Ipld::Map(map))
    }

    fn build_link(&self, link: &Link) -> Result<Ipld> {
        Ok(Ipld::Link(*link.cid()))
    }

    fn build_bool(&self, value: bool) -> Result<Ipld> {
        Ok(Ipld::Bool(value))
    }

    fn encode_node(&self, node: &Ipld) -> Result<Vec<u8>> {
        let bytes = serialization::to_vec(node)?;
        tracing::trace!(len = bytes.len(), "encoded DAG-CBOR node");
        Ok(bytes)
    }

    fn decode_node(&self, encoded: &[u8]) -> Result<Ipld> {
        serialization::from_slice(encoded).map_err(|e| {
            tracing::debug!(len = encoded.len(), error = %e, "DAG-CBOR decode failed");
            GraftError::from(e)
        })
    }
}
