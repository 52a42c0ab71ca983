//! Property test strategies for graft types
//!
//! Links are drawn from a small pool so generated operations overlap, which is
//! where ref counting gets interesting.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use graft_core::{Link, RequestId};
use graft_sync::{Metadata, MetadataItem};

use crate::fixtures::link;

/// Size of the link pool used by [`arb_link`]
pub const LINK_POOL_SIZE: u8 = 12;

/// Size of the request id pool used by [`arb_request_id`]
pub const REQUEST_POOL_SIZE: i32 = 6;

/// Strategy for links from a fixed pool
pub fn arb_link() -> impl Strategy<Value = Link> {
    (0..LINK_POOL_SIZE).prop_map(|seed| link(&format!("pool-{seed}")))
}

/// Strategy for request ids from a fixed pool
pub fn arb_request_id() -> impl Strategy<Value = RequestId> {
    (0..REQUEST_POOL_SIZE).prop_map(RequestId::new)
}

/// Strategy for a single metadata item
pub fn arb_metadata_item() -> impl Strategy<Value = MetadataItem> {
    (arb_link(), any::<bool>()).prop_map(|(link, present)| MetadataItem::new(link, present))
}

/// Strategy for metadata of up to `max_len` items, including empty
pub fn arb_metadata(max_len: usize) -> impl Strategy<Value = Metadata> {
    prop::collection::vec(arb_metadata_item(), 0..=max_len).prop_map(Metadata::from)
}

/// One call against a link tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOp {
    /// `record_link_traversal(request_id, link, has_block)`
    Record {
        /// Request performing the traversal
        request_id: RequestId,
        /// Link traversed
        link: Link,
        /// Whether the block was present
        has_block: bool,
    },
    /// `finish_request(request_id)`
    Finish {
        /// Request to retire
        request_id: RequestId,
    },
}

/// Strategy for a single tracker operation, weighted towards records
pub fn arb_tracker_op() -> impl Strategy<Value = TrackerOp> {
    prop_oneof![
        4 => (arb_request_id(), arb_link(), any::<bool>()).prop_map(
            |(request_id, link, has_block)| TrackerOp::Record {
                request_id,
                link,
                has_block,
            }
        ),
        1 => arb_request_id().prop_map(|request_id| TrackerOp::Finish { request_id }),
    ]
}

/// Strategy for an interleaved sequence of tracker operations
pub fn arb_tracker_ops(max_len: usize) -> impl Strategy<Value = Vec<TrackerOp>> {
    prop::collection::vec(arb_tracker_op(), 0..=max_len)
}
