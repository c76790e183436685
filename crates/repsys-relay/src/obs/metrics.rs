//! Minimal metrics registry for the relay.
//!
//! No metrics crate is used; counters and gauges carry dynamic labels backed by
//! `DashMap`. Labels are flattened into sorted key vectors to keep rendering
//! deterministic.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for one label set (0 when never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.value().load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let labels = label_str(r.key());
            if labels.is_empty() {
                let _ = writeln!(out, "{} {}", name, val);
            } else {
                let _ = writeln!(out, "{}{{{}}} {}", name, labels, val);
            }
        }
    }
}

#[derive(Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge\n{} {}", name, name, self.get());
    }
}

#[derive(Default)]
pub struct RelayMetrics {
    /// Poller iterations by outcome.
    pub polls: CounterVec,
    /// Republished messages by target class.
    pub reclassified: CounterVec,
    /// Non-Ok store answers by call.
    pub store_failures: CounterVec,
    /// Messages seen by the bulk scanner.
    pub scanned: CounterVec,
    /// Messages written to the display sink.
    pub displayed: CounterVec,
    pub queue_depth: Gauge,
    stopping: AtomicBool,
}

impl RelayMetrics {
    /// Mark shutdown in progress.
    pub fn set_stopping(&self) {
        self.stopping.store(true, Ordering::Relaxed);
    }
    /// Return whether shutdown has begun.
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Relaxed)
    }

    /// Render all registered metrics.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.polls.render("repsys_polls_total", &mut out);
        self.reclassified.render("repsys_reclassified_total", &mut out);
        self.store_failures.render("repsys_store_failures_total", &mut out);
        self.scanned.render("repsys_scanned_total", &mut out);
        self.displayed.render("repsys_displayed_total", &mut out);
        self.queue_depth.render("repsys_queue_depth", &mut out);

        let _ = writeln!(
            out,
            "# TYPE repsys_stopping gauge\nrepsys_stopping {}",
            if self.is_stopping() { 1 } else { 0 }
        );
        out
    }
}
