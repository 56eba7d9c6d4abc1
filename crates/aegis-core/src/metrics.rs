//! Global atomic counters for verification cycles.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    cycles_started: AtomicU64,
    attempts: AtomicU64,
    escalations: AtomicU64,
    successes: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            cycles_started: AtomicU64::new(0),
            attempts: AtomicU64::new(0),
            escalations: AtomicU64::new(0),
            successes: AtomicU64::new(0),
        }
    }

    pub fn inc_cycles_started(&self) {
        self.cycles_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cycles_started", "counter incremented");
    }

    pub fn inc_attempts(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "attempts", "counter incremented");
    }

    pub fn inc_escalations(&self) {
        self.escalations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "escalations", "counter incremented");
    }

    pub fn inc_successes(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "successes", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            cycles_started = self.cycles_started(),
            attempts = self.attempts(),
            escalations = self.escalations(),
            successes = self.successes(),
        );
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles_started.load(Ordering::Relaxed)
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn escalations(&self) -> u64 {
        self.escalations.load(Ordering::Relaxed)
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.cycles_started.store(0, Ordering::Relaxed);
        self.attempts.store(0, Ordering::Relaxed);
        self.escalations.store(0, Ordering::Relaxed);
        self.successes.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_cycles_started();
        m.inc_attempts();
        m.inc_attempts();
        m.inc_escalations();
        assert_eq!(m.cycles_started(), 1);
        assert_eq!(m.attempts(), 2);
        assert_eq!(m.escalations(), 1);
        assert_eq!(m.successes(), 0);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_cycles_started();
        m.inc_successes();
        m.reset();
        assert_eq!(m.cycles_started(), 0);
        assert_eq!(m.successes(), 0);
    }
}
