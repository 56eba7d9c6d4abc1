//! The seam between the cycle and whatever generates, tests or reviews.

use async_trait::async_trait;

use crate::domain::{AgentResponse, AgentTask};

/// Abnormal termination of a collaborator call.
///
/// The cycle turns every variant into a `FAIL` rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{collaborator} failed: {message}")]
    Failed { collaborator: String, message: String },

    #[error("{collaborator} timed out after {millis} ms")]
    TimedOut { collaborator: String, millis: u64 },
}

impl CollaboratorError {
    pub fn failed(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}

/// A participant in one cycle phase.
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Short name used in logs and rejection messages.
    fn name(&self) -> &str;

    async fn process(&self, task: &AgentTask) -> std::result::Result<AgentResponse, CollaboratorError>;
}
