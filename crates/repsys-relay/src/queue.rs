//! Reclassified-message queue between the poller and the display consumer.
//!
//! LIFO: a drain yields the newest message first, so messages left over from an
//! earlier round are shown after fresher ones. The queue is unbounded; its
//! depth is exported as `repsys_queue_depth`.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use repsys_core::Message;

#[derive(Default)]
pub struct MessageQueue {
    stack: Mutex<Vec<Message>>,
    not_empty: Condvar,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `msg` on top and wake one waiter. Returns the depth after the push.
    pub fn push(&self, msg: Message) -> usize {
        let depth = {
            let mut stack = self.stack.lock();
            stack.push(msg);
            stack.len()
        };
        self.not_empty.notify_one();
        depth
    }

    /// Pop everything under one lock, newest first. Never blocks on an empty queue.
    pub fn drain_all(&self) -> Vec<Message> {
        let mut stack = self.stack.lock();
        let mut out = Vec::with_capacity(stack.len());
        while let Some(msg) = stack.pop() {
            out.push(msg);
        }
        out
    }

    /// Wait up to `timeout` for at least one message. Returns whether one is present.
    pub fn wait_non_empty(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stack = self.stack.lock();
        while stack.is_empty() {
            if self.not_empty.wait_until(&mut stack, deadline).timed_out() {
                break;
            }
        }
        !stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.lock().is_empty()
    }
}
