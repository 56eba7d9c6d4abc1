//! Provider-agnostic extraction of code, prose or structured payloads from
//! model responses, plus the lightweight syntax checks shared with the verifier.

pub mod config;
pub mod content;
pub mod error;
pub mod extractor;
mod format;
pub mod language;
pub mod refusal;
pub mod response;
pub mod stats;
pub mod syntax;
pub mod tool_call;

pub use config::ExtractorConfig;
pub use content::{ContentKind, ExtractedContent, ExtractionMode, Provenance};
pub use error::{ExtractionError, FailureStage, Result};
pub use extractor::{format_tier, raw_content_tier, ResponseExtractor};
pub use format::score_block;
pub use language::Language;
pub use refusal::detect_refusal;
pub use response::{ModelMessage, RawModelOutput, ToolArguments, ToolInvocation};
pub use stats::ExtractionStats;
pub use syntax::{bracket_balance, validate, BracketBalance, BracketKind, Dialect, SyntaxIssue};
pub use tool_call::{tool_call_tier, ToolCallTier};
