//! repsys relay library entry.
//!
//! This crate wires the bulk scanner, the new-message poller, the LIFO queue
//! and the display consumer into one processor, plus the config loader, the
//! metrics registry and the ops endpoints. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod config;
pub mod display;
pub mod obs;
pub mod ops;
pub mod poller;
pub mod processor;
pub mod queue;
pub mod router;
pub mod scanner;
pub mod shutdown;
pub mod simulate;

pub use display::{DisplaySink, TracingSink};
pub use processor::{MessageProcessor, ProcessorSettings};
