//! GENERATE → TEST → REVIEW loop with a bounded attempt budget.
//!
//! Each attempt calls the generator, then the tester with the generated
//! data as candidate, then the reviewer. A rejection in any phase starts a
//! new attempt with the rejected output and feedback copied into the task
//! context. When the budget runs out the escalation handler is invoked and
//! the last rejecting response is returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::cycle::collaborator::{Collaborator, CollaboratorError};
use crate::cycle::escalation::{EscalationHandler, EscalationRequest, LogEscalation};
use crate::cycle::state::{CyclePhase, CycleVerdict, PhaseTransition};
use crate::domain::{AgentResponse, AgentStatus, AgentTask, ToolCallRecord};
use crate::metrics::METRICS;
use crate::obs::{self, CycleSpan};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Deadline for each collaborator call; `None` waits indefinitely.
    pub collaborator_timeout_ms: Option<u64>,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            collaborator_timeout_ms: None,
        }
    }
}

impl CycleConfig {
    /// Attempt budget, never below one.
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn collaborator_timeout(&self) -> Option<Duration> {
        self.collaborator_timeout_ms.map(Duration::from_millis)
    }
}

/// Final report of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub cycle_id: Uuid,
    /// Success response built from the accepted generation, or the last rejection.
    pub response: AgentResponse,
    /// Every tool call made by any collaborator, across all attempts.
    pub tool_calls: Vec<ToolCallRecord>,
    pub attempts: u32,
    pub summary: String,
    pub transitions: Vec<PhaseTransition>,
    pub escalated: bool,
    pub finished_at: DateTime<Utc>,
}

impl CycleOutcome {
    pub fn succeeded(&self) -> bool {
        self.response.status == AgentStatus::Success
    }
}

/// Whether a collaborator's status lets the cycle move past `phase`.
///
/// Review only accepts an explicit success; earlier phases accept anything
/// that is not a failure or retry request.
fn accepts(phase: CyclePhase, status: AgentStatus) -> bool {
    match phase {
        CyclePhase::Review => status == AgentStatus::Success,
        _ => !matches!(status, AgentStatus::Fail | AgentStatus::Retry),
    }
}

fn attempts_label(n: u32) -> String {
    if n == 1 {
        "1 attempt".to_string()
    } else {
        format!("{n} attempts")
    }
}

pub struct VerificationCycle {
    generator: Arc<dyn Collaborator>,
    tester: Arc<dyn Collaborator>,
    reviewer: Arc<dyn Collaborator>,
    escalation: Arc<dyn EscalationHandler>,
    config: CycleConfig,
}

impl VerificationCycle {
    pub fn new(
        generator: Arc<dyn Collaborator>,
        tester: Arc<dyn Collaborator>,
        reviewer: Arc<dyn Collaborator>,
    ) -> Self {
        Self {
            generator,
            tester,
            reviewer,
            escalation: Arc::new(LogEscalation),
            config: CycleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CycleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_escalation(mut self, handler: Arc<dyn EscalationHandler>) -> Self {
        self.escalation = handler;
        self
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    fn collaborator_for(&self, phase: CyclePhase) -> Option<&dyn Collaborator> {
        match phase {
            CyclePhase::Generate => Some(self.generator.as_ref()),
            CyclePhase::Test => Some(self.tester.as_ref()),
            CyclePhase::Review => Some(self.reviewer.as_ref()),
            CyclePhase::Done(_) => None,
        }
    }

    /// Call one collaborator; errors and timeouts come back as `FAIL` responses.
    async fn call(&self, collaborator: &dyn Collaborator, task: &AgentTask) -> AgentResponse {
        let result = match self.config.collaborator_timeout() {
            Some(limit) => tokio::time::timeout(limit, collaborator.process(task))
                .await
                .unwrap_or_else(|_| {
                    Err(CollaboratorError::TimedOut {
                        collaborator: collaborator.name().to_string(),
                        millis: limit.as_millis() as u64,
                    })
                }),
            None => collaborator.process(task).await,
        };
        result.unwrap_or_else(|err| AgentResponse::fail([err.to_string()]))
    }

    /// Drive `task` to a terminal phase. Never fails; collaborator problems
    /// are rejections.
    pub async fn run(&self, mut task: AgentTask) -> CycleOutcome {
        let cycle_id = Uuid::new_v4();
        let _span = CycleSpan::enter(cycle_id, &task.id);
        let started = Instant::now();
        let budget = self.config.attempt_budget();
        METRICS.inc_cycles_started();
        METRICS.inc_attempts();
        obs::emit_cycle_started(&task.id, budget);

        let mut phase = CyclePhase::Generate;
        let mut attempt: u32 = 1;
        let mut transitions = Vec::new();
        let mut tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut candidate: Option<Value> = None;
        let mut last_rejection: Option<(CyclePhase, AgentResponse)> = None;

        while let Some(collaborator) = self.collaborator_for(phase) {
            let request = match (phase, &candidate) {
                (CyclePhase::Generate, _) | (_, None) => task.clone(),
                (_, Some(data)) => task.follow_up(phase.task_kind(), attempt, data.clone()),
            };
            let response = self.call(collaborator, &request).await;
            tool_calls.extend(response.tool_calls.iter().cloned());

            let next = if accepts(phase, response.status) {
                if phase == CyclePhase::Generate {
                    candidate = Some(response.data.clone());
                }
                phase.on_accept()
            } else {
                obs::emit_rejected(attempt, phase, &response.errors);
                match phase {
                    CyclePhase::Test => {
                        task.context.previous_output = candidate.clone();
                        task.context.test_feedback = response.errors.clone();
                    }
                    CyclePhase::Review => {
                        task.context.previous_output = candidate.clone();
                        task.context.review_feedback = response.errors.clone();
                    }
                    _ => {}
                }
                last_rejection = Some((phase, response));
                phase.on_reject(attempt < budget)
            };

            obs::emit_phase_transition(attempt, phase, next);
            transitions.push(PhaseTransition {
                attempt,
                from: phase,
                to: next,
            });
            if next == CyclePhase::Generate {
                attempt += 1;
                candidate = None;
                METRICS.inc_attempts();
            }
            phase = next;
        }

        let (response, summary, escalated) = if phase == CyclePhase::Done(CycleVerdict::Success) {
            METRICS.inc_successes();
            let summary = format!("Verification completed in {}", attempts_label(attempt));
            let mut response = AgentResponse::success(candidate.unwrap_or_default())
                .with_trace(summary.clone());
            response.tool_calls = tool_calls.clone();
            (response, summary, false)
        } else {
            let summary = format!("Verification failed after {}", attempts_label(attempt));
            let (failed_phase, response) = last_rejection.unwrap_or_else(|| {
                (
                    CyclePhase::Generate,
                    AgentResponse::fail(["Maximum retry attempts exceeded"]),
                )
            });
            METRICS.inc_escalations();
            self.escalation.escalate(&EscalationRequest {
                cycle_id,
                task_id: task.id.clone(),
                reason: "Maximum attempts exhausted".to_string(),
                attempts: attempt,
                failed_phase,
                last_errors: response.errors.clone(),
                requested_at: Utc::now(),
            });
            (response, summary, true)
        };

        obs::emit_cycle_finished(
            attempt,
            response.status == AgentStatus::Success,
            escalated,
            started.elapsed().as_millis() as u64,
        );
        CycleOutcome {
            cycle_id,
            response,
            tool_calls,
            attempts: attempt,
            summary,
            transitions,
            escalated,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_rules() {
        assert!(accepts(CyclePhase::Generate, AgentStatus::Success));
        assert!(accepts(CyclePhase::Test, AgentStatus::Pending));
        assert!(!accepts(CyclePhase::Test, AgentStatus::Retry));
        assert!(!accepts(CyclePhase::Generate, AgentStatus::Fail));
        assert!(!accepts(CyclePhase::Review, AgentStatus::Pending));
        assert!(accepts(CyclePhase::Review, AgentStatus::Success));
    }

    #[test]
    fn test_budget_has_a_floor() {
        let config = CycleConfig {
            max_attempts: 0,
            collaborator_timeout_ms: Some(250),
        };
        assert_eq!(config.attempt_budget(), 1);
        assert_eq!(config.collaborator_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(attempts_label(1), "1 attempt");
        assert_eq!(attempts_label(3), "3 attempts");
    }
}
