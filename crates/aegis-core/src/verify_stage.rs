//! A TEST-phase collaborator backed by the code verifier.
//!
//! The candidate must declare the files it wrote as
//! `{"files": [{"path": ..., "purpose": ...}, ...]}`, relative to the
//! stage's root. A failed verification becomes a `FAIL` response whose
//! errors are the normalized issues followed by the guidance tips.

use std::path::PathBuf;

use async_trait::async_trait;
use code_verifier::{CodeVerifier, FileSpec, VerifierConfig};
use serde::Deserialize;

use crate::cycle::{Collaborator, CollaboratorError};
use crate::domain::{AgentResponse, AgentStatus, AgentTask};
use crate::feedback::{format_for_agent, Feedback};

const STAGE_NAME: &str = "verifier";

#[derive(Debug, Deserialize)]
struct DeclaredFiles {
    files: Vec<FileSpec>,
}

pub struct VerifierStage {
    verifier: CodeVerifier,
}

impl VerifierStage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            verifier: CodeVerifier::new(root),
        }
    }

    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.verifier = self.verifier.with_config(config);
        self
    }
}

#[async_trait]
impl Collaborator for VerifierStage {
    fn name(&self) -> &str {
        STAGE_NAME
    }

    async fn process(&self, task: &AgentTask) -> Result<AgentResponse, CollaboratorError> {
        let candidate = task
            .candidate
            .clone()
            .ok_or_else(|| CollaboratorError::failed(STAGE_NAME, "task carries no candidate"))?;
        let declared: DeclaredFiles = serde_json::from_value(candidate).map_err(|e| {
            CollaboratorError::failed(STAGE_NAME, format!("candidate does not declare files: {e}"))
        })?;

        let result = self
            .verifier
            .verify(&declared.files)
            .map_err(|e| CollaboratorError::failed(STAGE_NAME, e.to_string()))?;

        let data = serde_json::to_value(&result)
            .map_err(|e| CollaboratorError::failed(STAGE_NAME, e.to_string()))?;
        let feedback: Vec<Feedback> = result.issues.iter().map(Feedback::from).collect();

        let mut response = AgentResponse::success(data).with_trace(result.summary());
        if !result.passed {
            response.status = AgentStatus::Fail;
            response.errors = result
                .critical_errors()
                .into_iter()
                .map(ToString::to_string)
                .chain(result.guidance.tips.iter().map(|tip| format!("Tip: {tip}")))
                .collect();
            response.reasoning_trace = format!("{}\n{}", result.summary(), format_for_agent(&feedback));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_rejects_candidate_without_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let stage = VerifierStage::new(dir.path());
        let task = AgentTask::new("t", "test", json!({})).follow_up("test", 1, json!({"note": "x"}));
        let err = stage.process(&task).await.unwrap_err();
        assert!(err.to_string().contains("candidate does not declare files"));
    }

    #[tokio::test]
    async fn test_missing_file_fails_with_issue_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let stage = VerifierStage::new(dir.path());
        let task = AgentTask::new("t", "test", json!({}))
            .follow_up("test", 1, json!({"files": [{"path": "main.py", "purpose": "entry"}]}));
        let response = stage.process(&task).await.expect("verifier runs");
        assert_eq!(response.status, AgentStatus::Fail);
        assert_eq!(response.errors, vec!["ERROR: main.py: File does not exist"]);
        assert_eq!(response.data["passed"], json!(false));
    }
}
