//! Lightweight in-process metrics.
//!
//! Counters are plain atomics keyed by label sets and rendered by the `/metrics`
//! ops handler in Prometheus text format.

pub mod metrics;

pub use metrics::RelayMetrics;
