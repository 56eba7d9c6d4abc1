//! Structured observability hooks for the verification cycle.
//!
//! Events are emitted at `info!` level with an `event` field so they can be
//! filtered in JSON output.

use tracing::info;
use uuid::Uuid;

use crate::cycle::state::CyclePhase;

/// RAII guard that enters a cycle-scoped tracing span.
///
/// ```ignore
/// let _span = CycleSpan::enter(cycle_id, "task-1");
/// ```
pub struct CycleSpan {
    _span: tracing::span::EnteredSpan,
}

impl CycleSpan {
    pub fn enter(cycle_id: Uuid, task_id: &str) -> Self {
        let span = tracing::info_span!("aegis.cycle", cycle_id = %cycle_id, task_id = %task_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_cycle_started(task_id: &str, max_attempts: u32) {
    info!(event = "cycle.started", task_id = %task_id, max_attempts = max_attempts);
}

pub fn emit_phase_transition(attempt: u32, from: CyclePhase, to: CyclePhase) {
    info!(
        event = "cycle.transition",
        attempt = attempt,
        from = %from,
        to = %to,
    );
}

/// Rejection of one phase, with the collaborator's errors.
pub fn emit_rejected(attempt: u32, phase: CyclePhase, errors: &[String]) {
    tracing::warn!(
        event = "cycle.rejected",
        attempt = attempt,
        phase = %phase,
        errors = %errors.join("; "),
    );
}

pub fn emit_cycle_finished(attempts: u32, success: bool, escalated: bool, duration_ms: u64) {
    info!(
        event = "cycle.finished",
        attempts = attempts,
        success = success,
        escalated = escalated,
        duration_ms = duration_ms,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_and_events_do_not_panic_without_subscriber() {
        let _span = CycleSpan::enter(Uuid::new_v4(), "task-1");
        emit_cycle_started("task-1", 3);
        emit_phase_transition(1, CyclePhase::Generate, CyclePhase::Test);
        emit_rejected(1, CyclePhase::Test, &["boom".to_string()]);
        emit_cycle_finished(1, false, true, 5);
    }
}
