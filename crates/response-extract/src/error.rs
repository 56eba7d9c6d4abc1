//! Error types for response extraction and syntax validation.

use serde::{Deserialize, Serialize};

/// Stage at which extraction or validation gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// No usable content could be pulled out of the response.
    Extraction,
    /// The model declined the request.
    Refusal,
    /// Content was extracted but does not parse.
    Validation,
}

impl FailureStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Refusal => "refusal",
            Self::Validation => "validation",
        }
    }
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged extraction failure carrying the raw text that was being processed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed: {message}")]
pub struct ExtractionError {
    pub stage: FailureStage,
    pub message: String,
    /// Raw model text (or code under validation); empty when nothing was extracted.
    pub raw_content: String,
}

impl ExtractionError {
    pub fn new(
        stage: FailureStage,
        message: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            message: message.into(),
            raw_content: raw_content.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::new(FailureStage::Extraction, message, String::new())
    }

    pub fn refusal(raw_content: impl Into<String>) -> Self {
        Self::new(
            FailureStage::Refusal,
            "model declined to produce the requested content",
            raw_content,
        )
    }

    pub fn validation(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(FailureStage::Validation, message, code)
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
