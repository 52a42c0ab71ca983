//! Per-peer response assembly
//!
//! [`ResponseAssembler`] sits between a traversal and the outgoing message
//! stream for one peer. For every link the traversal reaches it:
//!
//! 1. decides whether the block must be sent, which is only when the block is
//!    present and no active request has already queued it;
//! 2. records the traversal in the shared [`LinkTracker`](crate::LinkTracker);
//! 3. appends a [`MetadataItem`] to the request's pending response.
//!
//! Steps 1 and 2 run under one tracker guard. Finishing a request retires its
//! tracker state and yields the final batch with a full or partial status.

use crate::metadata::{Metadata, MetadataError, MetadataItem};
use crate::shared::SharedLinkTracker;
use graft_core::{IpldBridge, Link, RequestId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response status codes carried alongside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResponseStatusCode {
    /// More batches will follow for this request
    PartialResponse = 14,
    /// Request finished and every traversed block was present
    RequestCompletedFull = 20,
    /// Request finished but at least one traversed block was missing
    RequestCompletedPartial = 21,
}

impl ResponseStatusCode {
    /// Wire value of the code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether this status ends the request
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::PartialResponse)
    }
}

/// A block queued for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Link the block is addressed by
    pub link: Link,
    /// Raw block bytes
    pub data: Vec<u8>,
}

/// Everything to send for one request at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBatch {
    /// Request the batch answers
    pub request_id: RequestId,
    /// Status to report
    pub status: ResponseStatusCode,
    /// Links covered since the previous batch, in traversal order
    pub metadata: Metadata,
    /// Blocks to transmit, in traversal order
    pub blocks: Vec<Block>,
}

impl ResponseBatch {
    /// Encode this batch's metadata for the wire
    pub fn encode_metadata<B: IpldBridge + ?Sized>(
        &self,
        bridge: &B,
    ) -> Result<Vec<u8>, MetadataError> {
        self.metadata.encode(bridge)
    }
}

#[derive(Debug, Default)]
struct PendingResponse {
    metadata: Metadata,
    blocks: Vec<Block>,
}

/// Builds responses for one peer, deduplicating blocks across its requests
#[derive(Debug, Default)]
pub struct ResponseAssembler {
    tracker: SharedLinkTracker,
    pending: HashMap<RequestId, PendingResponse>,
}

impl ResponseAssembler {
    /// Create an assembler with its own tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an assembler recording into an existing tracker
    pub fn with_tracker(tracker: SharedLinkTracker) -> Self {
        Self {
            tracker,
            pending: HashMap::new(),
        }
    }

    /// Tracker this assembler records into
    pub fn tracker(&self) -> &SharedLinkTracker {
        &self.tracker
    }

    /// Add a traversed link to `request_id`'s response
    ///
    /// `data` is the block if the responder has it. Returns whether the block
    /// was queued; a present block already held by an active request is
    /// reported in metadata but not queued again.
    pub fn send_link(&mut self, request_id: RequestId, link: Link, data: Option<&[u8]>) -> bool {
        let has_block = data.is_some();
        let send_block = self.tracker.with_tracker(|tracker| {
            let send_block = has_block && tracker.block_ref_count(&link) == 0;
            tracker.record_link_traversal(request_id, link, has_block);
            send_block
        });

        let pending = self.pending.entry(request_id).or_default();
        pending.metadata.push(MetadataItem::new(link, has_block));
        if let (true, Some(data)) = (send_block, data) {
            pending.blocks.push(Block {
                link,
                data: data.to_vec(),
            });
        }

        tracing::trace!(request_id = %request_id, link = %link, has_block, send_block, "added link to response");
        send_block
    }

    /// Drain what is pending for `request_id` as an intermediate batch
    ///
    /// Returns `None` when nothing has been added since the last batch.
    pub fn flush_request(&mut self, request_id: RequestId) -> Option<ResponseBatch> {
        let pending = self.pending.remove(&request_id)?;
        Some(ResponseBatch {
            request_id,
            status: ResponseStatusCode::PartialResponse,
            metadata: pending.metadata,
            blocks: pending.blocks,
        })
    }

    /// Complete `request_id` and return its final batch
    pub fn finish_request(&mut self, request_id: RequestId) -> ResponseBatch {
        let has_all_blocks = self.tracker.finish_request(request_id);
        let pending = self.pending.remove(&request_id).unwrap_or_default();
        let status = if has_all_blocks {
            ResponseStatusCode::RequestCompletedFull
        } else {
            ResponseStatusCode::RequestCompletedPartial
        };

        tracing::debug!(request_id = %request_id, status = status.code(), "completed response");
        ResponseBatch {
            request_id,
            status,
            metadata: pending.metadata,
            blocks: pending.blocks,
        }
    }

    /// Abandon `request_id`, releasing its tracker state and pending items
    pub fn cancel_request(&mut self, request_id: RequestId) {
        self.tracker.finish_request(request_id);
        let dropped = self
            .pending
            .remove(&request_id)
            .map_or(0, |pending| pending.metadata.len());
        tracing::debug!(request_id = %request_id, dropped, "cancelled response");
    }

    /// Number of requests with unflushed items
    pub fn pending_request_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::RAW_CODEC;

    fn block(name: &str) -> (Link, Vec<u8>) {
        let data = name.as_bytes().to_vec();
        (Link::for_block(RAW_CODEC, &data).unwrap(), data)
    }

    #[test]
    fn status_codes_match_protocol_values() {
        assert_eq!(ResponseStatusCode::PartialResponse.code(), 14);
        assert_eq!(ResponseStatusCode::RequestCompletedFull.code(), 20);
        assert_eq!(ResponseStatusCode::RequestCompletedPartial.code(), 21);
        assert!(!ResponseStatusCode::PartialResponse.is_terminal());
        assert!(ResponseStatusCode::RequestCompletedPartial.is_terminal());
    }

    #[test]
    fn repeated_link_in_one_request_is_sent_once() {
        let mut assembler = ResponseAssembler::new();
        let request = RequestId::new(1);
        let (link, data) = block("a");

        assert!(assembler.send_link(request, link, Some(data.as_slice())));
        assert!(!assembler.send_link(request, link, Some(data.as_slice())));

        let batch = assembler.finish_request(request);
        assert_eq!(batch.status, ResponseStatusCode::RequestCompletedFull);
        assert_eq!(batch.metadata.len(), 2);
        assert_eq!(batch.blocks.len(), 1);
    }

    #[test]
    fn missing_block_makes_response_partial() {
        let mut assembler = ResponseAssembler::new();
        let request = RequestId::new(1);
        let (present, data) = block("a");
        let (missing, _) = block("b");

        assembler.send_link(request, present, Some(data.as_slice()));
        assert!(!assembler.send_link(request, missing, None));

        let batch = assembler.finish_request(request);
        assert_eq!(batch.status, ResponseStatusCode::RequestCompletedPartial);
        assert_eq!(
            batch.metadata.as_slice(),
            &[
                MetadataItem::new(present, true),
                MetadataItem::new(missing, false)
            ]
        );
        assert_eq!(batch.blocks, vec![Block { link: present, data }]);
    }

    #[test]
    fn flush_returns_partial_batch_and_keeps_tracking() {
        let mut assembler = ResponseAssembler::new();
        let request = RequestId::new(1);
        let (a, data_a) = block("a");
        let (b, data_b) = block("b");

        assert!(assembler.flush_request(request).is_none());

        assembler.send_link(request, a, Some(data_a.as_slice()));
        let first = assembler.flush_request(request).unwrap();
        assert_eq!(first.status, ResponseStatusCode::PartialResponse);
        assert_eq!(assembler.tracker().block_ref_count(&a), 1);

        assembler.send_link(request, b, Some(data_b.as_slice()));
        let last = assembler.finish_request(request);
        assert_eq!(last.metadata.as_slice(), &[MetadataItem::new(b, true)]);
        assert_eq!(assembler.tracker().block_ref_count(&a), 0);
    }

    #[test]
    fn cancel_releases_tracker_state() {
        let mut assembler = ResponseAssembler::new();
        let request = RequestId::new(1);
        let (a, data) = block("a");

        assembler.send_link(request, a, Some(data.as_slice()));
        assembler.cancel_request(request);

        assert_eq!(assembler.pending_request_count(), 0);
        assert!(assembler.tracker().with_tracker(|t| t.is_empty()));
        assert!(assembler.send_link(RequestId::new(2), a, Some(data.as_slice())));
    }
}
