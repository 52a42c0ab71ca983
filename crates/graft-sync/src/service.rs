//! Single-task link tracker service
//!
//! [`LinkTrackerHandle::spawn`] moves a [`LinkTracker`] into a dedicated tokio
//! task. Handles talk to it over a bounded channel, so every tracker call is
//! applied in the order it was sent and no lock is ever taken on the hot path.
//!
//! Traversal records are fire-and-forget; queries and `finish_request` wait
//! for a reply, bounded by the configured command timeout. The task stops once
//! every handle has been dropped.

use crate::config::LinkTrackerServiceConfig;
use crate::linktracker::LinkTracker;
use graft_core::{Link, RequestId};
use tokio::sync::{mpsc, oneshot};

/// Errors talking to the tracker task
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerServiceError {
    /// The tracker task is gone
    #[error("link tracker service closed")]
    Closed,

    /// No reply within the configured timeout
    #[error("link tracker did not reply within {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed
        timeout_ms: u64,
    },
}

/// Commands processed by the tracker task
#[derive(Debug)]
enum TrackerCommand {
    BlockRefCount {
        link: Link,
        reply: oneshot::Sender<usize>,
    },
    IsKnownMissingLink {
        request_id: RequestId,
        link: Link,
        reply: oneshot::Sender<bool>,
    },
    RecordLinkTraversal {
        request_id: RequestId,
        link: Link,
        has_block: bool,
    },
    FinishRequest {
        request_id: RequestId,
        reply: oneshot::Sender<bool>,
    },
}

/// Cloneable handle to a tracker owned by a background task
#[derive(Debug, Clone)]
pub struct LinkTrackerHandle {
    command_tx: mpsc::Sender<TrackerCommand>,
    config: LinkTrackerServiceConfig,
}

impl LinkTrackerHandle {
    /// Spawn the tracker task with a fresh tracker
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: LinkTrackerServiceConfig) -> Self {
        Self::spawn_with_tracker(config, LinkTracker::new())
    }

    /// Spawn the tracker task owning `tracker`
    pub fn spawn_with_tracker(config: LinkTrackerServiceConfig, tracker: LinkTracker) -> Self {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size.max(1));
        tokio::spawn(Self::command_loop(command_rx, tracker));
        Self { command_tx, config }
    }

    /// Service configuration
    pub fn config(&self) -> &LinkTrackerServiceConfig {
        &self.config
    }

    /// See [`LinkTracker::block_ref_count`]
    pub async fn block_ref_count(&self, link: Link) -> Result<usize, TrackerServiceError> {
        self.request(|reply| TrackerCommand::BlockRefCount { link, reply })
            .await
    }

    /// See [`LinkTracker::is_known_missing_link`]
    pub async fn is_known_missing_link(
        &self,
        request_id: RequestId,
        link: Link,
    ) -> Result<bool, TrackerServiceError> {
        self.request(|reply| TrackerCommand::IsKnownMissingLink {
            request_id,
            link,
            reply,
        })
        .await
    }

    /// See [`LinkTracker::record_link_traversal`]
    ///
    /// Returns once the record is queued; later commands from any handle
    /// observe it.
    pub async fn record_link_traversal(
        &self,
        request_id: RequestId,
        link: Link,
        has_block: bool,
    ) -> Result<(), TrackerServiceError> {
        self.command_tx
            .send(TrackerCommand::RecordLinkTraversal {
                request_id,
                link,
                has_block,
            })
            .await
            .map_err(|_| TrackerServiceError::Closed)
    }

    /// See [`LinkTracker::finish_request`]
    pub async fn finish_request(&self, request_id: RequestId) -> Result<bool, TrackerServiceError> {
        self.request(|reply| TrackerCommand::FinishRequest { request_id, reply })
            .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> TrackerCommand,
    ) -> Result<T, TrackerServiceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| TrackerServiceError::Closed)?;

        match tokio::time::timeout(self.config.command_timeout(), reply_rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(TrackerServiceError::Closed),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.command_timeout_ms,
                    "link tracker reply timed out"
                );
                Err(TrackerServiceError::Timeout {
                    timeout_ms: self.config.command_timeout_ms,
                })
            }
        }
    }

    async fn command_loop(mut command_rx: mpsc::Receiver<TrackerCommand>, mut tracker: LinkTracker) {
        tracing::info!("link tracker service started");

        while let Some(command) = command_rx.recv().await {
            match command {
                TrackerCommand::BlockRefCount { link, reply } => {
                    let _ = reply.send(tracker.block_ref_count(&link));
                }
                TrackerCommand::IsKnownMissingLink {
                    request_id,
                    link,
                    reply,
                } => {
                    let _ = reply.send(tracker.is_known_missing_link(request_id, &link));
                }
                TrackerCommand::RecordLinkTraversal {
                    request_id,
                    link,
                    has_block,
                } => tracker.record_link_traversal(request_id, link, has_block),
                TrackerCommand::FinishRequest { request_id, reply } => {
                    // Retire even if the caller stopped waiting.
                    let has_all_blocks = tracker.finish_request(request_id);
                    let _ = reply.send(has_all_blocks);
                }
            }
        }

        tracing::info!(
            leaked_requests = tracker.tracked_request_count(),
            "link tracker service stopped"
        );
    }
}
