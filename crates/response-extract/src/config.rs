//! Extractor configuration and default vocabularies.

use serde::{Deserialize, Serialize};

use crate::content::ExtractionMode;

/// Reasoning wrappers stripped before format handling.
pub const DEFAULT_REASONING_TAGS: &[&str] = &[
    "think",
    "thinking",
    "reasoning",
    "thought",
    "analysis",
    "rationale",
    "chain-of-thought",
    "reflection",
    "思考",
    "推理",
];

/// Tool names whose arguments are expected to carry generated code.
pub const DEFAULT_CODE_TOOLS: &[&str] = &[
    "write_code",
    "write_file",
    "create_file",
    "save_file",
    "generate_code",
    "submit_code",
    "final_result",
];

/// Argument keys searched (in order) for the code payload.
pub const DEFAULT_CODE_PARAMETERS: &[&str] = &["code", "content", "file_content", "source", "text"];

/// Lowercase phrases that mark a refusal.
pub const DEFAULT_REFUSAL_PHRASES: &[&str] = &[
    "i'm sorry, but i can't",
    "i'm sorry, but i cannot",
    "i am sorry, but i cannot",
    "i cannot help with",
    "i can't help with",
    "i cannot assist with",
    "i can't assist with",
    "i'm unable to help",
    "i am unable to help",
    "i'm not able to help",
    "i must decline",
    "i won't be able to help",
    "i cannot fulfill",
    "i can't fulfill",
    "i cannot comply",
    "i can't comply",
    "as an ai language model, i cannot",
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Configuration for [`crate::ResponseExtractor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub mode: ExtractionMode,
    pub reasoning_tags: Vec<String>,
    pub code_tools: Vec<String>,
    pub code_parameters: Vec<String>,
    pub refusal_phrases: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            reasoning_tags: owned(DEFAULT_REASONING_TAGS),
            code_tools: owned(DEFAULT_CODE_TOOLS),
            code_parameters: owned(DEFAULT_CODE_PARAMETERS),
            refusal_phrases: owned(DEFAULT_REFUSAL_PHRASES),
        }
    }
}

impl ExtractorConfig {
    pub fn strict() -> Self {
        Self::default().with_mode(ExtractionMode::Strict)
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_reasoning_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reasoning_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_code_tool(mut self, name: impl Into<String>) -> Self {
        self.code_tools.push(name.into());
        self
    }

    pub fn with_refusal_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.refusal_phrases.push(phrase.into().to_lowercase());
        self
    }
}
