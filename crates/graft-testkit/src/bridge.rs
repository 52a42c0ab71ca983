//! In-memory tree-data bridge
//!
//! [`MemoryBridge`] keeps encoded values in a table and hands out short
//! opaque handles as "bytes". Decoding a handle returns a clone of the stored
//! value, so codec tests run without depending on any wire format. Builds and
//! encodes can be made to fail to exercise error propagation.

use graft_core::{GraftError, IpldBridge, Link, Result};
use ipld_core::ipld::Ipld;
use parking_lot::Mutex;
use std::collections::BTreeMap;

const HANDLE_PREFIX: &[u8; 4] = b"mem\0";

#[derive(Debug, Default)]
struct BridgeState {
    nodes: Vec<Ipld>,
    fail_builds: bool,
    fail_encodes: bool,
}

/// Fake bridge storing values in memory
#[derive(Debug, Default)]
pub struct MemoryBridge {
    state: Mutex<BridgeState>,
}

impl MemoryBridge {
    /// Create an empty bridge
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent build call fail
    pub fn fail_builds(&self) {
        self.state.lock().fail_builds = true;
    }

    /// Make every subsequent encode call fail
    pub fn fail_encodes(&self) {
        self.state.lock().fail_encodes = true;
    }

    /// Store an arbitrary value and return its handle, bypassing builders
    ///
    /// Lets tests decode shapes the builders would never produce.
    pub fn store(&self, node: Ipld) -> Vec<u8> {
        let mut state = self.state.lock();
        state.nodes.push(node);
        handle_for(state.nodes.len() - 1)
    }

    /// Number of values encoded so far
    pub fn stored_count(&self) -> usize {
        self.state.lock().nodes.len()
    }

    fn check_build(&self) -> Result<()> {
        if self.state.lock().fail_builds {
            return Err(GraftError::internal("memory bridge build failure"));
        }
        Ok(())
    }
}

fn handle_for(index: usize) -> Vec<u8> {
    let mut handle = HANDLE_PREFIX.to_vec();
    handle.extend_from_slice(&(index as u64).to_be_bytes());
    handle
}

fn index_of(handle: &[u8]) -> Option<usize> {
    let rest = handle.strip_prefix(HANDLE_PREFIX.as_slice())?;
    let bytes: [u8; 8] = rest.try_into().ok()?;
    usize::try_from(u64::from_be_bytes(bytes)).ok()
}

impl IpldBridge for MemoryBridge {
    fn build_list(&self, items: Vec<Ipld>) -> Result<Ipld> {
        self.check_build()?;
        Ok(Ipld::List(items))
    }

    fn build_map(&self, entries: Vec<(&str, Ipld)>) -> Result<Ipld> {
        self.check_build()?;
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            if map.insert(key.to_string(), value).is_some() {
                return Err(GraftError::invalid(format!("duplicate map key `{key}`")));
            }
        }
        Ok(Ipld::Map(map))
    }

    fn build_link(&self, link: &Link) -> Result<Ipld> {
        self.check_build()?;
        Ok(Ipld::Link(*link.cid()))
    }

    fn build_bool(&self, value: bool) -> Result<Ipld> {
        self.check_build()?;
        Ok(Ipld::Bool(value))
    }

    fn encode_node(&self, node: &Ipld) -> Result<Vec<u8>> {
        if self.state.lock().fail_encodes {
            return Err(GraftError::serialization("memory bridge encode failure"));
        }
        Ok(self.store(node.clone()))
    }

    fn decode_node(&self, encoded: &[u8]) -> Result<Ipld> {
        let state = self.state.lock();
        index_of(encoded)
            .and_then(|index| state.nodes.get(index).cloned())
            .ok_or_else(|| GraftError::serialization("unknown memory bridge handle"))
    }
}
