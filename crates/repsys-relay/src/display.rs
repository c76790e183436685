//! Queue display consumer.
//!
//! Every `display_interval` the queue is drained and each message's current
//! text is handed to a `DisplaySink`. Nothing here writes to the store.

use std::sync::Arc;

use repsys_core::{Message, MessageStore};

use crate::obs::RelayMetrics;
use crate::queue::MessageQueue;
use crate::shutdown::StopSignal;

/// Destination of displayed messages.
pub trait DisplaySink: Send + Sync {
    fn display(&self, msg: &Message, content: &str);
}

/// Default sink: one `info` event per message on the `repsys::display` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DisplaySink for TracingSink {
    fn display(&self, msg: &Message, content: &str) {
        tracing::info!(
            target: "repsys::display",
            handle = %msg.handle(),
            class = %msg.class(),
            comp = msg.comp_nr(),
            msg_nr = msg.msg_nr(),
            "retrieved message [{content}]"
        );
    }
}

pub struct DisplayConsumer<S> {
    store: Arc<S>,
    queue: Arc<MessageQueue>,
    sink: Arc<dyn DisplaySink>,
    content_len: usize,
    metrics: Arc<RelayMetrics>,
}

impl<S: MessageStore> DisplayConsumer<S> {
    pub fn new(
        store: Arc<S>,
        queue: Arc<MessageQueue>,
        sink: Arc<dyn DisplaySink>,
        content_len: usize,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            store,
            queue,
            sink,
            content_len,
            metrics,
        }
    }

    /// Drain the queue once, newest first. Returns how many messages reached the sink.
    pub fn drain_once(&self) -> usize {
        let batch = self.queue.drain_all();
        self.metrics
            .queue_depth
            .set(i64::try_from(self.queue.len()).unwrap_or(i64::MAX));

        let mut shown = 0;
        for msg in &batch {
            match msg.content(&*self.store, self.content_len) {
                Ok(text) => {
                    self.sink.display(msg, &text);
                    shown += 1;
                }
                Err(e) => {
                    tracing::warn!(handle = %msg.handle(), error = %e, "cannot fetch message text");
                    self.metrics.store_failures.inc(&[("op", "format_message")]);
                }
            }
        }
        self.metrics.displayed.add(&[], shown as u64);
        shown
    }

    /// Drain every `interval` until `stop` is raised.
    pub fn run(self, interval: std::time::Duration, stop: StopSignal) {
        tracing::info!(interval_ms = interval.as_millis() as u64, "display consumer started");
        while stop.sleep(interval) {
            self.drain_once();
        }
        tracing::info!(pending = self.queue.len(), "display consumer stopped");
    }
}
