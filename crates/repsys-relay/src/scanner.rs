//! One-shot scan of messages already in the store.
//!
//! Walks first -> next over the class mask and reclassifies every message from
//! the tracked origin. Nothing is queued. A failure on one message is logged
//! and counted; the walk goes on.

use std::sync::Arc;

use repsys_core::reclassify::reclassify;
use repsys_core::{ClassMask, Message, MessageStore, MsgHandle};

use crate::obs::RelayMetrics;
use crate::processor::ProcessorSettings;

/// Summary of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Handles returned by the store.
    pub visited: usize,
    /// Visited messages from the tracked origin.
    pub tracked: usize,
    /// Tracked messages republished under a new class.
    pub reclassified: usize,
    /// Messages that could not be resolved or republished.
    pub failures: usize,
    /// Highest handle the walk reached.
    pub last_handle: Option<MsgHandle>,
}

pub struct BulkScanner<S> {
    store: Arc<S>,
    settings: ProcessorSettings,
    metrics: Arc<RelayMetrics>,
}

impl<S: MessageStore> BulkScanner<S> {
    pub fn new(store: Arc<S>, settings: ProcessorSettings, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            store,
            settings,
            metrics,
        }
    }

    pub fn scan_and_reclassify_all(&self, mask: ClassMask) -> ScanReport {
        let mut report = ScanReport::default();

        let Ok(mut handle) = self.store.first(mask) else {
            tracing::info!(%mask, "no existing messages in range");
            return report;
        };
        tracing::info!(%mask, "retrieving existing messages");

        loop {
            report.visited += 1;
            report.last_handle = report.last_handle.max(Some(handle));
            self.visit(handle, &mut report);

            match self.store.next(mask, handle) {
                Ok(next) => handle = next,
                Err(_) => break,
            }
        }

        self.metrics.scanned.add(&[], report.visited as u64);
        tracing::info!(
            visited = report.visited,
            tracked = report.tracked,
            reclassified = report.reclassified,
            failures = report.failures,
            "existing messages scanned"
        );
        report
    }

    fn visit(&self, handle: MsgHandle, report: &mut ScanReport) {
        let mut msg = match Message::from_handle(&*self.store, handle) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(%handle, error = %e, "cannot resolve existing message");
                self.metrics.store_failures.inc(&[("op", e.op().unwrap_or("metadata"))]);
                report.failures += 1;
                return;
            }
        };
        if msg.comp_nr() != self.settings.tracked_component {
            return;
        }
        report.tracked += 1;
        tracing::debug!(%handle, "before reclassification\n{msg}");

        match reclassify(&*self.store, &mut msg, self.settings.content_len) {
            Ok(r) if r.changed => {
                report.reclassified += 1;
                let class = format!("{:?}", r.class);
                self.metrics.reclassified.inc(&[("class", class.as_str())]);
                tracing::debug!(%handle, "after reclassification\n{msg}");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(%handle, error = %e, "republish failed");
                self.metrics.store_failures.inc(&[("op", e.op().unwrap_or("reclassify"))]);
                report.failures += 1;
            }
        }
    }
}
