//! Self-correcting verification cycle.

pub mod collaborator;
pub mod engine;
pub mod escalation;
pub mod state;

pub use collaborator::{Collaborator, CollaboratorError};
pub use engine::{CycleConfig, CycleOutcome, VerificationCycle, DEFAULT_MAX_ATTEMPTS};
pub use escalation::{EscalationHandler, EscalationRequest, LogEscalation};
pub use state::{CyclePhase, CycleVerdict, PhaseTransition};
