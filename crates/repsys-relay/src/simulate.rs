//! Test-message generator.
//!
//! Raises `TEST<n>` messages at a fixed pace so the relay has something to
//! pick up when no real controller is attached. Message n uses n as both
//! instance and message number.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use repsys_core::error::{RepSysError, Result};
use repsys_core::{MessageStore, MsgClass};

use crate::shutdown::StopSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub class: MsgClass,
    pub component: u32,
    pub interval: Duration,
}

pub struct MessageGenerator<S> {
    store: Arc<S>,
    settings: GeneratorSettings,
    counter: u32,
}

impl<S: MessageStore + 'static> MessageGenerator<S> {
    pub fn new(store: Arc<S>, settings: GeneratorSettings) -> Self {
        Self {
            store,
            settings,
            counter: 0,
        }
    }

    /// Raise the next test message.
    pub fn emit_once(&mut self) -> Result<u32> {
        self.counter = self.counter.wrapping_add(1);
        let id = self.counter;
        let text = format!("TEST{id}");
        self.store
            .publish(self.settings.class, self.settings.component, id, id, "%s", &[text.as_str()])
            .map_err(|state| RepSysError::store("publish", state))?;
        Ok(id)
    }

    /// Run on a dedicated thread until `stop` is raised.
    pub fn spawn(mut self, stop: StopSignal) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("repsys-generator".into())
            .spawn(move || {
                tracing::info!(class = %self.settings.class, comp = self.settings.component, "test message generator started");
                while stop.sleep(self.settings.interval) {
                    match self.emit_once() {
                        Ok(id) => tracing::debug!(id, "test message raised"),
                        Err(e) => tracing::warn!(error = %e, "test message rejected"),
                    }
                }
                tracing::info!(raised = self.counter, "test message generator stopped");
            })
            .map_err(|e| RepSysError::Internal(format!("spawn generator failed: {e}")))
    }
}
