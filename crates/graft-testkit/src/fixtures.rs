//! Deterministic fixtures
//!
//! Links are derived from a name, so `link("L_A")` is the same value in every
//! test and every run.

use graft_core::{Link, RequestId, RAW_CODEC};

/// Link for a raw block whose content is `name`
pub fn link(name: &str) -> Link {
    Link::for_block(RAW_CODEC, name.as_bytes()).expect("32-byte digest always fits")
}

/// `count` distinct links named `{prefix}-0`, `{prefix}-1`, ...
pub fn links(prefix: &str, count: usize) -> Vec<Link> {
    (0..count).map(|i| link(&format!("{prefix}-{i}"))).collect()
}

/// Request id with the given wire value
pub fn request(value: i32) -> RequestId {
    RequestId::new(value)
}
