//! Mutex-guarded link tracker
//!
//! [`SharedLinkTracker`] is a cloneable owner of one [`LinkTracker`]. Every
//! call holds the guard for exactly one tracker operation; compound decisions
//! that must see a consistent tracker (read a ref count, then record) go
//! through [`SharedLinkTracker::with_tracker`].

use crate::linktracker::LinkTracker;
use graft_core::{Link, RequestId};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, lock-guarded handle to a [`LinkTracker`]
#[derive(Debug, Clone, Default)]
pub struct SharedLinkTracker {
    inner: Arc<Mutex<LinkTracker>>,
}

impl SharedLinkTracker {
    /// Create a handle around a fresh tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an existing tracker
    pub fn from_tracker(tracker: LinkTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// See [`LinkTracker::block_ref_count`]
    pub fn block_ref_count(&self, link: &Link) -> usize {
        self.inner.lock().block_ref_count(link)
    }

    /// See [`LinkTracker::is_known_missing_link`]
    pub fn is_known_missing_link(&self, request_id: RequestId, link: &Link) -> bool {
        self.inner.lock().is_known_missing_link(request_id, link)
    }

    /// See [`LinkTracker::record_link_traversal`]
    pub fn record_link_traversal(&self, request_id: RequestId, link: Link, has_block: bool) {
        self.inner
            .lock()
            .record_link_traversal(request_id, link, has_block);
    }

    /// See [`LinkTracker::finish_request`]
    pub fn finish_request(&self, request_id: RequestId) -> bool {
        self.inner.lock().finish_request(request_id)
    }

    /// Run `f` with exclusive access to the tracker
    ///
    /// The guard is held for the whole closure, so other handles observe
    /// either none or all of its effects.
    pub fn with_tracker<R>(&self, f: impl FnOnce(&mut LinkTracker) -> R) -> R {
        let mut tracker = self.inner.lock();
        f(&mut tracker)
    }
}
