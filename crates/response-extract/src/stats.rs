//! Per-extractor atomic counters.
//!
//! Counters are bumped silently on the hot path; take a [`ExtractionStats`]
//! snapshot or call [`StatsCounters::flush`] to report them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::content::Provenance;

/// Point-in-time copy of an extractor's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub calls: u64,
    pub tool_call_hits: u64,
    pub markdown_hits: u64,
    pub plain_hits: u64,
    pub refusals: u64,
    pub failures: u64,
    pub truncation_warnings: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    calls: AtomicU64,
    tool_call_hits: AtomicU64,
    markdown_hits: AtomicU64,
    plain_hits: AtomicU64,
    refusals: AtomicU64,
    failures: AtomicU64,
    truncation_warnings: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn inc_calls(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_hit(&self, provenance: Provenance) {
        let counter = match provenance {
            Provenance::ToolCall => &self.tool_call_hits,
            Provenance::Markdown => &self.markdown_hits,
            Provenance::Plain => &self.plain_hits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_refusals(&self) {
        self.refusals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_truncation_warnings(&self) {
        self.truncation_warnings.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ExtractionStats {
        ExtractionStats {
            calls: self.calls.load(Ordering::Relaxed),
            tool_call_hits: self.tool_call_hits.load(Ordering::Relaxed),
            markdown_hits: self.markdown_hits.load(Ordering::Relaxed),
            plain_hits: self.plain_hits.load(Ordering::Relaxed),
            refusals: self.refusals.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            truncation_warnings: self.truncation_warnings.load(Ordering::Relaxed),
        }
    }

    /// Emit current values as one `info!` event.
    pub(crate) fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "extraction.flush",
            calls = s.calls,
            tool_call_hits = s.tool_call_hits,
            markdown_hits = s.markdown_hits,
            plain_hits = s.plain_hits,
            refusals = s.refusals,
            failures = s.failures,
            truncation_warnings = s.truncation_warnings,
        );
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.calls,
            &self.tool_call_hits,
            &self.markdown_hits,
            &self.plain_hits,
            &self.refusals,
            &self.failures,
            &self.truncation_warnings,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
