//! Global atomic counters for triage requests.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event, e.g. before the CLI exits.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters. No allocations, no locking.
pub struct Metrics {
    requests: AtomicU64,
    classified: AtomicU64,
    undetected: AtomicU64,
    failed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            classified: AtomicU64::new(0),
            undetected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// A triage request was accepted.
    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "requests", "counter incremented");
    }

    /// A report named a matching rule.
    pub fn inc_classified(&self) {
        self.classified.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "classified", "counter incremented");
    }

    /// A report fell back to the undetected diagnosis.
    pub fn inc_undetected(&self) {
        self.undetected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "undetected", "counter incremented");
    }

    /// A request ended in an error.
    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "failed", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            requests = self.requests(),
            classified = self.classified(),
            undetected = self.undetected(),
            failed = self.failed(),
        );
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn classified(&self) -> u64 {
        self.classified.load(Ordering::Relaxed)
    }

    pub fn undetected(&self) -> u64 {
        self.undetected.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.classified.store(0, Ordering::Relaxed);
        self.undetected.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}
