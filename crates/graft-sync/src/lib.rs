//! # Graft Sync - responder-side bookkeeping for graph sync
//!
//! A responder streams the blocks reached by a requester's selector traversal.
//! This crate provides the parts of that path that decide what is sent and how
//! the response is described:
//!
//! - [`LinkTracker`]: per-request and per-link traversal bookkeeping, used to
//!   avoid resending blocks still held by active requests and to decide
//!   whether a response is complete
//! - [`SharedLinkTracker`] and [`LinkTrackerHandle`]: the two ways to share a
//!   tracker between concurrent requests (a mutex, or a single owning task)
//! - [`Metadata`] and its codec: the ordered `(link, blockPresent)` record sent
//!   with every response
//! - [`ResponseAssembler`]: per-peer response building on top of the above
//!
//! ## Design Principles
//!
//! - **No hidden locking**: the tracker itself is plain data; callers pick the
//!   sharing discipline
//! - **All-or-nothing decoding**: metadata decodes fully or returns an error
//! - **Pluggable tree data**: the codec only talks to an [`IpldBridge`](graft_core::IpldBridge)

#![forbid(unsafe_code)]

pub mod config;
pub mod linktracker;
pub mod metadata;
pub mod response;
pub mod service;
pub mod shared;

pub use config::LinkTrackerServiceConfig;
pub use linktracker::LinkTracker;
pub use metadata::{decode_metadata, encode_metadata, Metadata, MetadataError, MetadataItem};
pub use response::{Block, ResponseAssembler, ResponseBatch, ResponseStatusCode};
pub use service::{LinkTrackerHandle, TrackerServiceError};
pub use shared::SharedLinkTracker;
