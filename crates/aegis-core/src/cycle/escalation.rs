//! Human escalation once the attempt budget is spent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycle::state::CyclePhase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRequest {
    pub cycle_id: Uuid,
    pub task_id: String,
    pub reason: String,
    pub attempts: u32,
    /// Phase whose rejection ended the cycle.
    pub failed_phase: CyclePhase,
    pub last_errors: Vec<String>,
    pub requested_at: DateTime<Utc>,
}

/// Called synchronously, exactly once, when a cycle fails.
pub trait EscalationHandler: Send + Sync {
    fn escalate(&self, request: &EscalationRequest);
}

/// Default handler: a warning-level event and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEscalation;

impl EscalationHandler for LogEscalation {
    fn escalate(&self, request: &EscalationRequest) {
        tracing::warn!(
            event = "cycle.escalated",
            cycle_id = %request.cycle_id,
            task_id = %request.task_id,
            reason = %request.reason,
            attempts = request.attempts,
            failed_phase = %request.failed_phase,
            errors = ?request.last_errors,
            "human intervention required"
        );
    }
}
