//! Extracted content and the declarations that steer extraction.

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// What the caller expects the response to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Source code, optionally for a specific language (narrows fence matching).
    Code(Option<Language>),
    /// Prose with reasoning and code blocks removed.
    Text,
    /// Returned untouched for the caller to decode.
    Structured,
}

impl ContentKind {
    pub fn code() -> Self {
        Self::Code(None)
    }

    pub fn code_in(language: Language) -> Self {
        Self::Code(Some(language))
    }
}

/// Which tier produced the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    ToolCall,
    Markdown,
    Plain,
}

/// Failure handling policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Surface tagged failures to the caller.
    Strict,
    /// Degrade to best-effort text, empty on total failure.
    #[default]
    Lenient,
}

impl std::str::FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown extraction mode: {other}")),
        }
    }
}

/// Normalized output of one extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub text: String,
    pub kind: ContentKind,
    pub provenance: Provenance,
}

impl ExtractedContent {
    pub fn new(text: impl Into<String>, kind: ContentKind, provenance: Provenance) -> Self {
        Self {
            text: text.into(),
            kind,
            provenance,
        }
    }

    /// Lenient-mode result after a total failure.
    pub fn empty(kind: ContentKind) -> Self {
        Self::new(String::new(), kind, Provenance::Plain)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl std::fmt::Display for ExtractedContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
