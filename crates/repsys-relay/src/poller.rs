//! New-message poller (producer side).
//!
//! Each round asks the store for the most recent message in the class mask.
//! A handle newer than the last one seen is resolved, filtered on the tracked
//! origin, reclassified, and pushed onto the queue.
//!
//! Store handles grow with every new occurrence, so the last-seen handle is a
//! high-water mark: it advances for every resolved message, including ones
//! from other origins, and never moves back. When a reclassified message
//! leaves the class mask, `last(mask)` falls back to an older handle; that
//! handle is at or below the mark and counts as unchanged.

use std::sync::Arc;

use repsys_core::reclassify::reclassify;
use repsys_core::{ApiState, Message, MessageStore, MsgHandle};

use crate::obs::RelayMetrics;
use crate::processor::ProcessorSettings;
use crate::queue::MessageQueue;
use crate::shutdown::StopSignal;

/// What one poll round did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No handle newer than the last one seen.
    Unchanged,
    /// New message from another origin; dropped.
    Filtered(MsgHandle),
    /// New tracked message, reclassified (if needed) and queued.
    Enqueued(MsgHandle),
    /// New message carrying a class or state outside the known set; skipped for good.
    Rejected(MsgHandle),
    /// The store answered non-Ok; nothing changed.
    StoreError(ApiState),
}

impl PollOutcome {
    fn label(&self) -> &'static str {
        match self {
            PollOutcome::Unchanged => "unchanged",
            PollOutcome::Filtered(_) => "filtered",
            PollOutcome::Enqueued(_) => "enqueued",
            PollOutcome::Rejected(_) => "rejected",
            PollOutcome::StoreError(_) => "store_error",
        }
    }
}

pub struct Poller<S> {
    store: Arc<S>,
    queue: Arc<MessageQueue>,
    settings: ProcessorSettings,
    metrics: Arc<RelayMetrics>,
    last_seen: MsgHandle,
}

impl<S: MessageStore> Poller<S> {
    pub fn new(
        store: Arc<S>,
        queue: Arc<MessageQueue>,
        settings: ProcessorSettings,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            store,
            queue,
            settings,
            metrics,
            last_seen: MsgHandle::NONE,
        }
    }

    /// Start from `handle` instead of `MsgHandle::NONE`.
    pub fn with_last_seen(mut self, handle: MsgHandle) -> Self {
        self.last_seen = handle;
        self
    }

    pub fn last_seen(&self) -> MsgHandle {
        self.last_seen
    }

    /// One poll round.
    pub fn poll_once(&mut self) -> PollOutcome {
        let outcome = self.poll_inner();
        self.metrics.polls.inc(&[("outcome", outcome.label())]);
        outcome
    }

    fn poll_inner(&mut self) -> PollOutcome {
        let handle = match self.store.last(self.settings.class_mask) {
            Ok(h) => h,
            Err(state) => {
                // "No message in range" is the normal idle answer.
                tracing::trace!(%state, "last message query returned nothing");
                return PollOutcome::StoreError(state);
            }
        };
        if handle <= self.last_seen {
            return PollOutcome::Unchanged;
        }

        let mut msg = match Message::from_handle(&*self.store, handle) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(%handle, error = %e, "cannot resolve new message");
                return match e.api_state() {
                    Some(state) => {
                        self.metrics.store_failures.inc(&[("op", "metadata")]);
                        PollOutcome::StoreError(state)
                    }
                    None => {
                        self.last_seen = handle;
                        PollOutcome::Rejected(handle)
                    }
                };
            }
        };

        self.last_seen = handle;
        if msg.comp_nr() != self.settings.tracked_component {
            tracing::debug!(%handle, comp = msg.comp_nr(), "ignoring message from untracked origin");
            return PollOutcome::Filtered(handle);
        }

        match reclassify(&*self.store, &mut msg, self.settings.content_len) {
            Ok(r) if r.changed => {
                let class = format!("{:?}", r.class);
                self.metrics.reclassified.inc(&[("class", class.as_str())]);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(%handle, class = %msg.class(), error = %e, "republish failed");
                self.metrics.store_failures.inc(&[("op", e.op().unwrap_or("reclassify"))]);
            }
        }

        let depth = self.queue.push(msg);
        self.metrics.queue_depth.set(i64::try_from(depth).unwrap_or(i64::MAX));
        tracing::info!(%handle, depth, "queued new message");
        PollOutcome::Enqueued(handle)
    }

    /// Poll every `poll_interval` until `stop` is raised.
    pub fn run(mut self, stop: StopSignal) {
        tracing::info!(
            mask = %self.settings.class_mask,
            interval_ms = self.settings.poll_interval.as_millis() as u64,
            "poller started"
        );
        while stop.sleep(self.settings.poll_interval) {
            self.poll_once();
        }
        tracing::info!(last_seen = %self.last_seen, "poller stopped");
    }
}
