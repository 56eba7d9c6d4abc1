//! The response extraction engine.
//!
//! Extraction walks an ordered chain of tiers, first success wins:
//!
//! 1. code-bearing tool invocation on the last message
//! 2. first text part of the last message
//! 3. refusal detection on that text
//! 4. format handling (reasoning removal, fenced blocks, discourse cleanup)
//!
//! Each tier is a free function so it can be exercised on its own.

use regex::Regex;
use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::content::{ContentKind, ExtractedContent, ExtractionMode, Provenance};
use crate::error::{ExtractionError, FailureStage, Result};
use crate::format;
use crate::language::Language;
use crate::refusal::detect_refusal;
use crate::response::RawModelOutput;
use crate::stats::{ExtractionStats, StatsCounters};
use crate::syntax;
use crate::tool_call::{tool_call_tier, ToolCallTier};

/// Tier 2: the first non-empty text part of the last message.
pub fn raw_content_tier(response: &RawModelOutput) -> Option<&str> {
    response
        .last_message()?
        .first_part()
        .filter(|text| !text.trim().is_empty())
}

/// Tier 4: shape raw text for the declared kind.
///
/// Returns `None` when nothing usable is left once reasoning is removed.
pub fn format_tier(
    raw: &str,
    kind: ContentKind,
    reasoning: &[Regex],
) -> Option<(String, Provenance)> {
    let (text, provenance) = match kind {
        ContentKind::Structured => (raw.to_string(), Provenance::Plain),
        ContentKind::Text => {
            let cleaned = format::strip_reasoning(raw, reasoning);
            let prose = format::remove_fenced_blocks(&cleaned);
            (prose.trim().to_string(), Provenance::Plain)
        }
        ContentKind::Code(language) => {
            let cleaned = format::strip_reasoning(raw, reasoning);
            let cleaned = cleaned.trim();
            match format::select_best_block(format::fenced_blocks(cleaned, language)) {
                Some(block) => (block, Provenance::Markdown),
                None => (format::clean_raw_code(cleaned), Provenance::Plain),
            }
        }
    };
    if text.trim().is_empty() {
        None
    } else {
        Some((text, provenance))
    }
}

/// Provider-agnostic extractor with per-instance counters.
#[derive(Debug)]
pub struct ResponseExtractor {
    config: ExtractorConfig,
    reasoning: Vec<Regex>,
    stats: StatsCounters,
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl ResponseExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let reasoning = format::reasoning_patterns(&config.reasoning_tags);
        Self {
            config,
            reasoning,
            stats: StatsCounters::default(),
        }
    }

    pub fn strict() -> Self {
        Self::new(ExtractorConfig::strict())
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract content using the configured mode.
    pub fn extract(&self, response: &RawModelOutput, kind: ContentKind) -> Result<ExtractedContent> {
        self.extract_with_mode(response, kind, self.config.mode)
    }

    /// Extract content, overriding the configured mode for this call.
    pub fn extract_with_mode(
        &self,
        response: &RawModelOutput,
        kind: ContentKind,
        mode: ExtractionMode,
    ) -> Result<ExtractedContent> {
        self.stats.inc_calls();

        let outcome = self.run_tiers(response, kind);
        let err = match outcome {
            Ok(content) => {
                self.stats.inc_hit(content.provenance);
                if let ContentKind::Code(language) = kind {
                    self.check_truncation(&content.text, language);
                }
                debug!(
                    event = "extraction.succeeded",
                    provenance = ?content.provenance,
                    bytes = content.text.len()
                );
                return Ok(content);
            }
            Err(err) => err,
        };

        match err.stage {
            FailureStage::Refusal => self.stats.inc_refusals(),
            _ => self.stats.inc_failures(),
        }
        warn!(event = "extraction.failed", stage = %err.stage, reason = %err.message);

        match mode {
            ExtractionMode::Strict => Err(err),
            ExtractionMode::Lenient => Ok(ExtractedContent::empty(kind)),
        }
    }

    /// Check that extracted code parses for its language.
    pub fn validate(&self, code: &str, language: Option<Language>) -> Result<()> {
        syntax::validate(code, language)
    }

    pub fn stats(&self) -> ExtractionStats {
        self.stats.snapshot()
    }

    /// Emit the counters as a single tracing event.
    pub fn flush_stats(&self) {
        self.stats.flush();
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    fn run_tiers(&self, response: &RawModelOutput, kind: ContentKind) -> Result<ExtractedContent> {
        let last = response
            .last_message()
            .ok_or_else(|| ExtractionError::extraction("no messages in response"))?;

        let mut malformed_tool = None;
        if matches!(kind, ContentKind::Code(_)) {
            match tool_call_tier(last, &self.config) {
                ToolCallTier::Hit(code) => {
                    return Ok(ExtractedContent::new(code, kind, Provenance::ToolCall));
                }
                ToolCallTier::Malformed { tool } => malformed_tool = Some(tool),
                ToolCallTier::Miss => {}
            }
        }

        let raw = raw_content_tier(response).ok_or_else(|| match &malformed_tool {
            Some(tool) => ExtractionError::extraction(format!(
                "tool call '{tool}' carried malformed arguments and the message has no text content"
            )),
            None => ExtractionError::extraction("last message has no text content"),
        })?;

        if let Some(phrase) = detect_refusal(raw, &self.config.refusal_phrases) {
            debug!(phrase = %phrase, "refusal phrase matched");
            return Err(ExtractionError::refusal(raw));
        }

        let (text, provenance) = format_tier(raw, kind, &self.reasoning).ok_or_else(|| {
            ExtractionError::new(
                FailureStage::Extraction,
                "no content left after removing reasoning",
                raw,
            )
        })?;
        Ok(ExtractedContent::new(text, kind, provenance))
    }

    fn check_truncation(&self, code: &str, language: Option<Language>) {
        if syntax::looks_truncated(code, language) {
            self.stats.inc_truncation_warnings();
            warn!(
                event = "extraction.possibly_truncated",
                language = language.map(Language::as_str).unwrap_or("unknown"),
                bytes = code.len(),
            );
        }
    }
}
