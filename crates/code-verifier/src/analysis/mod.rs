//! Layer 2: per-language static analysis.
//!
//! Every analyser is a pure function from source text to a [`FileAnalysis`];
//! the verifier attaches file paths and layer numbers afterwards.

pub mod data;
pub mod markup;
pub mod python;
pub mod script;
pub mod style;

use response_extract::Language;

use crate::config::VerifierConfig;
use crate::symbols::SymbolEntry;
use crate::types::Severity;

/// A finding without file context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            line: None,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            line: None,
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAnalysis {
    /// Absent when the file could not be parsed far enough to extract facts.
    pub entry: Option<SymbolEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileAnalysis {
    pub fn facts(entry: SymbolEntry) -> Self {
        Self {
            entry: Some(entry),
            diagnostics: Vec::new(),
        }
    }

    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            entry: None,
            diagnostics: vec![diagnostic],
        }
    }

    pub fn with(mut self, diagnostic: Option<Diagnostic>) -> Self {
        self.diagnostics.extend(diagnostic);
        self
    }
}

/// Dispatch on language; `None` for languages without an analyser.
pub fn analyze(language: Language, source: &str, config: &VerifierConfig) -> Option<FileAnalysis> {
    let analysis = match language {
        Language::Python => python::analyze(source, &config.unfinished_markers),
        Language::JavaScript | Language::Jsx | Language::TypeScript => {
            script::analyze(source, &config.unfinished_markers)
        }
        Language::Html => markup::analyze(source),
        Language::Css => style::analyze(source),
        Language::Json => data::analyze(source),
        Language::Yaml => return None,
    };
    Some(analysis)
}

/// Non-fatal warning when any unfinished-work marker appears.
pub(crate) fn unfinished_markers(source: &str, markers: &[String]) -> Option<Diagnostic> {
    if markers.is_empty() || !markers.iter().any(|m| source.contains(m.as_str())) {
        return None;
    }
    Some(Diagnostic::warning(format!(
        "File contains unfinished code markers ({})",
        markers.join("/")
    )))
}

/// 1-based line of a byte offset.
pub(crate) fn line_at(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset.min(source.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
