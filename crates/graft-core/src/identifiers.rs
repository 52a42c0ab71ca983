//! Link and request identifiers
//!
//! A [`Link`] is a CIDv1 naming an immutable block. A [`RequestId`] scopes one
//! peer's in-flight traversal request. Both are `Copy` and hashable so they can
//! key the tracker's maps directly.

use crate::errors::{GraftError, Result};
use ipld_core::cid::multihash::Multihash;
use ipld_core::cid::Cid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multicodec code for raw binary blocks
pub const RAW_CODEC: u64 = 0x55;

/// Multicodec code for DAG-CBOR blocks
pub const DAG_CBOR_CODEC: u64 = 0x71;

/// Multihash code for BLAKE3 with a 32-byte digest
pub const BLAKE3_MULTIHASH_CODE: u64 = 0x1e;

/// Content-addressed identifier for an immutable block
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Link(Cid);

impl Link {
    /// Wrap an existing CID
    pub fn new(cid: Cid) -> Self {
        Self(cid)
    }

    /// Derive the CIDv1 link for `data` under `codec`, hashed with BLAKE3
    pub fn for_block(codec: u64, data: &[u8]) -> Result<Self> {
        let digest = blake3::hash(data);
        let multihash = Multihash::<64>::wrap(BLAKE3_MULTIHASH_CODE, digest.as_bytes())
            .map_err(|e| GraftError::invalid(format!("cannot wrap block digest: {e}")))?;
        Ok(Self(Cid::new_v1(codec, multihash)))
    }

    /// The underlying CID
    pub fn cid(&self) -> &Cid {
        &self.0
    }

    /// Multicodec of the linked block
    pub fn codec(&self) -> u64 {
        self.0.codec()
    }
}

impl From<Cid> for Link {
    fn from(cid: Cid) -> Self {
        Self(cid)
    }
}

impl From<Link> for Cid {
    fn from(link: Link) -> Self {
        link.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.0)
    }
}

/// Identifier for one peer's in-flight traversal request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(i32);

impl RequestId {
    /// Create a request id from its wire value
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// Wire value of this id
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl From<i32> for RequestId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_links_are_deterministic() {
        let a = Link::for_block(RAW_CODEC, b"hello").unwrap();
        let b = Link::for_block(RAW_CODEC, b"hello").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.codec(), RAW_CODEC);
    }

    #[test]
    fn codec_is_part_of_identity() {
        let raw = Link::for_block(RAW_CODEC, b"hello").unwrap();
        let cbor = Link::for_block(DAG_CBOR_CODEC, b"hello").unwrap();
        assert_ne!(raw, cbor);
    }

    #[test]
    fn different_blocks_have_different_links() {
        let a = Link::for_block(RAW_CODEC, b"a").unwrap();
        let b = Link::for_block(RAW_CODEC, b"b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn link_displays_as_cid_string() {
        let link = Link::for_block(RAW_CODEC, b"hello").unwrap();
        assert_eq!(link.to_string(), link.cid().to_string());
        assert!(link.to_string().starts_with('b'));
    }

    #[test]
    fn request_id_round_trips_through_i32() {
        let id = RequestId::from(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }
}
