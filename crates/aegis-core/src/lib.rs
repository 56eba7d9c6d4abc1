//! Aegis core: the generate/test/review verification cycle, feedback
//! normalization, and re-exports of the extraction and verification crates.

pub mod config;
pub mod cycle;
pub mod domain;
pub mod feedback;
pub mod metrics;
pub mod obs;
pub mod telemetry;
pub mod verify_stage;

pub use config::{AegisConfig, TelemetryConfig};
pub use cycle::{
    Collaborator, CollaboratorError, CycleConfig, CycleOutcome, CyclePhase, CycleVerdict,
    EscalationHandler, EscalationRequest, LogEscalation, PhaseTransition, VerificationCycle,
};
pub use domain::{
    AegisError, AgentResponse, AgentStatus, AgentTask, Result, TaskContext, ToolCallRecord,
};
pub use feedback::{
    format_for_agent, parse_agent_review, parse_mypy_output, parse_pylint_output,
    parse_pytest_output, Feedback,
};
pub use metrics::METRICS;
pub use verify_stage::VerifierStage;

pub use code_verifier::{
    verify_generated_code, CodeVerifier, FileSpec, Guidance, GuidanceTopic, Layer, Severity,
    VerificationIssue, VerificationResult, VerifierConfig,
};
pub use response_extract::{
    ContentKind, ExtractedContent, ExtractionError, ExtractionMode, ExtractorConfig,
    FailureStage, Language, RawModelOutput, ResponseExtractor,
};
