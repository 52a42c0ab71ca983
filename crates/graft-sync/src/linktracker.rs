//! Link traversal tracking across in-flight requests
//!
//! A responder walks many requests at once, and overlapping requests often
//! reach the same links. [`LinkTracker`] answers two questions cheaply:
//!
//! - has a block for this link already been queued by a request that is still
//!   active? ([`LinkTracker::block_ref_count`])
//! - did a given request ever reach a link whose block was missing?
//!   ([`LinkTracker::finish_request`])
//!
//! # Invariants
//!
//! For every link `L`, `ref_counts[L]` equals the number of occurrences of `L`
//! across the blocked-links sequences of all requests still tracked. A link
//! with no active traversals has no entry at all, and a request that recorded
//! no misses has no missing-set entry.
//!
//! # Concurrency
//!
//! The tracker has no internal locking. Share it through
//! [`SharedLinkTracker`](crate::shared::SharedLinkTracker) or
//! [`LinkTrackerHandle`](crate::service::LinkTrackerHandle).
//!
//! # Usage
//!
//! ```rust
//! use graft_core::{Link, RequestId, RAW_CODEC};
//! use graft_sync::LinkTracker;
//!
//! # fn main() -> graft_core::Result<()> {
//! let mut tracker = LinkTracker::new();
//! let request = RequestId::new(1);
//! let link = Link::for_block(RAW_CODEC, b"block")?;
//!
//! tracker.record_link_traversal(request, link, true);
//! assert_eq!(tracker.block_ref_count(&link), 1);
//!
//! assert!(tracker.finish_request(request));
//! assert_eq!(tracker.block_ref_count(&link), 0);
//! # Ok(())
//! # }
//! ```

use graft_core::{Link, RequestId};
use std::collections::{HashMap, HashSet};

/// Records link traversals per request and block reference counts per link
#[derive(Debug, Clone, Default)]
pub struct LinkTracker {
    /// Links recorded as missing, per request
    missing_by_request: HashMap<RequestId, HashSet<Link>>,
    /// Links traversed with a present block, per request, in traversal order
    blocked_links_by_request: HashMap<RequestId, Vec<Link>>,
    /// Present-block traversals by active requests, per link
    ref_counts: HashMap<Link, usize>,
}

impl LinkTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of present-block traversals of `link` by requests still active
    pub fn block_ref_count(&self, link: &Link) -> usize {
        self.ref_counts.get(link).copied().unwrap_or(0)
    }

    /// Whether `request_id` recorded `link` as missing and is not yet finished
    pub fn is_known_missing_link(&self, request_id: RequestId, link: &Link) -> bool {
        self.missing_by_request
            .get(&request_id)
            .is_some_and(|missing| missing.contains(link))
    }

    /// Record that `request_id` traversed `link`, and whether its block was present
    ///
    /// A link may be traversed more than once in one request; every present
    /// traversal counts toward the link's reference count.
    pub fn record_link_traversal(&mut self, request_id: RequestId, link: Link, has_block: bool) {
        if has_block {
            self.blocked_links_by_request
                .entry(request_id)
                .or_default()
                .push(link);
            *self.ref_counts.entry(link).or_insert(0) += 1;
        } else {
            self.missing_by_request
                .entry(request_id)
                .or_default()
                .insert(link);
        }
        tracing::trace!(request_id = %request_id, link = %link, has_block, "recorded link traversal");
    }

    /// Retire `request_id` and report whether every traversed link had its block
    ///
    /// Must be called exactly once per request, including abandoned ones.
    /// Calling it again for a retired request returns `true` and changes
    /// nothing.
    pub fn finish_request(&mut self, request_id: RequestId) -> bool {
        let missing = self.missing_by_request.remove(&request_id);
        let has_all_blocks = missing.is_none();

        let Some(links) = self.blocked_links_by_request.remove(&request_id) else {
            tracing::debug!(request_id = %request_id, has_all_blocks, "finished request with no present blocks");
            return has_all_blocks;
        };

        for link in &links {
            if let Some(count) = self.ref_counts.get_mut(link) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.ref_counts.remove(link);
                }
            }
        }

        tracing::debug!(
            request_id = %request_id,
            has_all_blocks,
            released = links.len(),
            missing = missing.map_or(0, |m| m.len()),
            "finished request"
        );
        has_all_blocks
    }

    /// Whether any state is held for `request_id`
    pub fn is_tracking(&self, request_id: RequestId) -> bool {
        self.missing_by_request.contains_key(&request_id)
            || self.blocked_links_by_request.contains_key(&request_id)
    }

    /// Number of requests with state held
    pub fn tracked_request_count(&self) -> usize {
        self.blocked_links_by_request
            .keys()
            .chain(self.missing_by_request.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of links with a non-zero reference count
    pub fn tracked_link_count(&self) -> usize {
        self.ref_counts.len()
    }

    /// Whether the tracker holds no state at all
    pub fn is_empty(&self) -> bool {
        self.missing_by_request.is_empty()
            && self.blocked_links_by_request.is_empty()
            && self.ref_counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::RAW_CODEC;

    fn link(name: &str) -> Link {
        Link::for_block(RAW_CODEC, name.as_bytes()).unwrap()
    }

    #[test]
    fn unknown_link_has_zero_ref_count() {
        let tracker = LinkTracker::new();
        assert_eq!(tracker.block_ref_count(&link("a")), 0);
        assert!(!tracker.is_known_missing_link(RequestId::new(1), &link("a")));
    }

    #[test]
    fn repeated_present_traversals_accumulate() {
        let mut tracker = LinkTracker::new();
        let request = RequestId::new(1);
        let a = link("a");

        for _ in 0..3 {
            tracker.record_link_traversal(request, a, true);
        }
        assert_eq!(tracker.block_ref_count(&a), 3);

        assert!(tracker.finish_request(request));
        assert_eq!(tracker.block_ref_count(&a), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn overlapping_requests_share_ref_counts() {
        let mut tracker = LinkTracker::new();
        let (r1, r2) = (RequestId::new(1), RequestId::new(2));
        let a = link("a");

        tracker.record_link_traversal(r1, a, true);
        tracker.record_link_traversal(r2, a, true);
        assert_eq!(tracker.block_ref_count(&a), 2);

        tracker.finish_request(r1);
        assert_eq!(tracker.block_ref_count(&a), 1);

        tracker.finish_request(r2);
        assert_eq!(tracker.block_ref_count(&a), 0);
        assert_eq!(tracker.tracked_link_count(), 0);
    }

    #[test]
    fn missing_links_are_scoped_to_their_request() {
        let mut tracker = LinkTracker::new();
        let (r1, r2) = (RequestId::new(1), RequestId::new(2));
        let b = link("b");

        tracker.record_link_traversal(r1, b, false);
        tracker.record_link_traversal(r1, b, false);

        assert!(tracker.is_known_missing_link(r1, &b));
        assert!(!tracker.is_known_missing_link(r2, &b));
        assert_eq!(tracker.block_ref_count(&b), 0);
    }

    #[test]
    fn request_with_no_traversals_has_all_blocks() {
        let mut tracker = LinkTracker::new();
        assert!(tracker.finish_request(RequestId::new(7)));
    }

    #[test]
    fn mixed_traversal_reports_partial_and_retires_state() {
        let mut tracker = LinkTracker::new();
        let request = RequestId::new(1);
        let (a, b) = (link("a"), link("b"));

        tracker.record_link_traversal(request, a, true);
        tracker.record_link_traversal(request, b, false);
        tracker.record_link_traversal(request, a, true);

        assert_eq!(tracker.block_ref_count(&a), 2);
        assert!(tracker.is_known_missing_link(request, &b));
        assert!(tracker.is_tracking(request));

        assert!(!tracker.finish_request(request));
        assert_eq!(tracker.block_ref_count(&a), 0);
        assert!(!tracker.is_known_missing_link(request, &b));
        assert!(!tracker.is_tracking(request));
        assert!(tracker.is_empty());
    }

    #[test]
    fn second_finish_reports_complete_without_touching_counts() {
        let mut tracker = LinkTracker::new();
        let (r1, r2) = (RequestId::new(1), RequestId::new(2));
        let (a, b) = (link("a"), link("b"));

        tracker.record_link_traversal(r1, a, true);
        tracker.record_link_traversal(r1, b, false);
        tracker.record_link_traversal(r2, a, true);

        assert!(!tracker.finish_request(r1));
        assert!(tracker.finish_request(r1));
        assert_eq!(tracker.block_ref_count(&a), 1);
    }

    #[test]
    fn tracked_request_count_counts_each_request_once() {
        let mut tracker = LinkTracker::new();
        let (r1, r2) = (RequestId::new(1), RequestId::new(2));

        tracker.record_link_traversal(r1, link("a"), true);
        tracker.record_link_traversal(r1, link("b"), false);
        tracker.record_link_traversal(r2, link("c"), false);

        assert_eq!(tracker.tracked_request_count(), 2);
        assert_eq!(tracker.tracked_link_count(), 1);
    }
}
