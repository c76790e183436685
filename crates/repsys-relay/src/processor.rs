//! Message processor: wires scanner, poller, queue and display consumer.
//!
//! Lifecycle:
//! 1. `scan_existing` reclassifies what is already in the store (calling thread).
//! 2. `start` spawns the poller and display threads around one shared queue.
//! 3. `shutdown` raises the stop signal and joins both threads (also run on drop).

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use repsys_core::error::{RepSysError, Result};
use repsys_core::{ClassMask, MessageStore, MsgHandle, SAFETY_COMPONENT};

use crate::display::{DisplayConsumer, DisplaySink};
use crate::obs::RelayMetrics;
use crate::poller::Poller;
use crate::queue::MessageQueue;
use crate::scanner::{BulkScanner, ScanReport};
use crate::shutdown::StopSignal;

/// Runtime settings shared by scanner, poller and display consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorSettings {
    /// Classes scanned and polled.
    pub class_mask: ClassMask,
    /// Only messages from this component are reclassified and queued.
    pub tracked_component: u32,
    /// Text buffer size for every content fetch.
    pub content_len: usize,
    pub poll_interval: Duration,
    pub display_interval: Duration,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            class_mask: ClassMask::DEFAULT_RANGE,
            tracked_component: SAFETY_COMPONENT,
            content_len: 60,
            poll_interval: Duration::from_secs(3),
            display_interval: Duration::from_secs(5),
        }
    }
}

pub struct MessageProcessor<S> {
    store: Arc<S>,
    settings: ProcessorSettings,
    sink: Arc<dyn DisplaySink>,
    queue: Arc<MessageQueue>,
    metrics: Arc<RelayMetrics>,
    stop: StopSignal,
    last_seen: MsgHandle,
    threads: Vec<JoinHandle<()>>,
    started: bool,
}

impl<S: MessageStore + 'static> MessageProcessor<S> {
    pub fn new(store: Arc<S>, settings: ProcessorSettings, sink: Arc<dyn DisplaySink>) -> Self {
        Self {
            store,
            settings,
            sink,
            queue: Arc::new(MessageQueue::new()),
            metrics: Arc::new(RelayMetrics::default()),
            stop: StopSignal::new(),
            last_seen: MsgHandle::NONE,
            threads: Vec::new(),
            started: false,
        }
    }

    /// Share an existing metrics registry (e.g. with the ops endpoints).
    pub fn with_metrics(mut self, metrics: Arc<RelayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    pub fn queue(&self) -> Arc<MessageQueue> {
        Arc::clone(&self.queue)
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Reclassify the messages already in the store.
    ///
    /// The poller later starts from the highest handle seen here. Nothing the
    /// scan visited is queued, even after a reclassified message leaves the
    /// class mask and an older one surfaces as `last(mask)`.
    pub fn scan_existing(&mut self) -> ScanReport {
        let scanner = BulkScanner::new(Arc::clone(&self.store), self.settings, Arc::clone(&self.metrics));
        let report = scanner.scan_and_reclassify_all(self.settings.class_mask);
        if let Some(h) = report.last_handle {
            self.last_seen = h;
        }
        report
    }

    /// Spawn the poller and display threads.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RepSysError::AlreadyStarted);
        }

        let poller = Poller::new(
            Arc::clone(&self.store),
            Arc::clone(&self.queue),
            self.settings,
            Arc::clone(&self.metrics),
        )
        .with_last_seen(self.last_seen);
        let display = DisplayConsumer::new(
            Arc::clone(&self.store),
            Arc::clone(&self.queue),
            Arc::clone(&self.sink),
            self.settings.content_len,
            Arc::clone(&self.metrics),
        );

        let stop = self.stop.clone();
        let poller_thread = thread::Builder::new()
            .name("repsys-poller".into())
            .spawn(move || poller.run(stop))
            .map_err(|e| RepSysError::Internal(format!("spawn poller failed: {e}")))?;
        self.threads.push(poller_thread);

        let stop = self.stop.clone();
        let interval = self.settings.display_interval;
        let display_thread = thread::Builder::new()
            .name("repsys-display".into())
            .spawn(move || display.run(interval, stop));
        match display_thread {
            Ok(t) => self.threads.push(t),
            Err(e) => {
                self.shutdown();
                return Err(RepSysError::Internal(format!("spawn display failed: {e}")));
            }
        }

        self.started = true;
        Ok(())
    }
}

impl<S> MessageProcessor<S> {
    /// Ask both loops to exit. Returns immediately.
    pub fn stop(&self) {
        self.metrics.set_stopping();
        self.stop.stop();
    }

    /// Wait for both threads to finish.
    pub fn join(&mut self) {
        for t in self.threads.drain(..) {
            let name = t.thread().name().unwrap_or("repsys-worker").to_string();
            if t.join().is_err() {
                tracing::error!(thread = %name, "worker thread panicked");
            } else {
                tracing::debug!(thread = %name, "worker thread joined");
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.stop();
        self.join();
    }
}

impl<S> Drop for MessageProcessor<S> {
    fn drop(&mut self) {
        if !self.threads.is_empty() {
            self.shutdown();
        }
    }
}
