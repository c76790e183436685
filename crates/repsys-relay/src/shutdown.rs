//! Cooperative stop signal for the background loops.
//!
//! Loops sleep through `StopSignal::sleep`, which returns early as soon as
//! `stop` is raised, so shutdown never waits out a full poll interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    stopped: Mutex<bool>,
    cond: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake every sleeper.
    pub fn stop(&self) {
        let mut stopped = self.inner.stopped.lock();
        *stopped = true;
        self.inner.cond.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.stopped.lock()
    }

    /// Sleep for `dur`. Returns `false` if the signal was raised before or during the wait.
    pub fn sleep(&self, dur: Duration) -> bool {
        let deadline = Instant::now() + dur;
        let mut stopped = self.inner.stopped.lock();
        while !*stopped {
            if self.inner.cond.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        !*stopped
    }
}
