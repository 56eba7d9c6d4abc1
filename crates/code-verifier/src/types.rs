//! Report types shared by all verification layers.

use std::collections::BTreeMap;
use std::fmt;

use response_extract::Language;
use serde::{Deserialize, Serialize};

use crate::guidance::Guidance;

/// Declared intent to produce a file, relative to the verification root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    pub path: String,
    #[serde(default)]
    pub purpose: String,
}

impl FileSpec {
    pub fn new(path: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            purpose: purpose.into(),
        }
    }
}

/// Issue severity; declaration order is ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification layer that produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Layer 1: files exist and have content.
    Structure,
    /// Layer 2: per-language static analysis.
    Static,
    /// Layer 3: cross-file semantics.
    Semantic,
}

impl Layer {
    pub fn number(self) -> u8 {
        match self {
            Self::Structure => 1,
            Self::Static => 2,
            Self::Semantic => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationIssue {
    pub severity: Severity,
    pub layer: Layer,
    pub file_path: String,
    pub line: Option<usize>,
    pub message: String,
    #[serde(default)]
    pub auto_fixable: bool,
}

impl VerificationIssue {
    pub fn new(
        severity: Severity,
        layer: Layer,
        file_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            layer,
            file_path: file_path.into(),
            line: None,
            message: message.into(),
            auto_fixable: false,
        }
    }

    pub fn error(layer: Layer, file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, layer, file_path, message)
    }

    pub fn warning(layer: Layer, file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, layer, file_path, message)
    }

    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    pub fn fixable(mut self) -> Self {
        self.auto_fixable = true;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for VerificationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.as_str().to_uppercase(), self.file_path)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        write!(f, ": {}", self.message)?;
        if self.auto_fixable {
            f.write_str(" [auto-fixable]")?;
        }
        Ok(())
    }
}

/// Layer-1 metadata recorded per declared file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCheck {
    pub exists: bool,
    pub size: usize,
    pub language: Option<Language>,
    pub lines: usize,
    /// Hex sha256 of the file contents.
    pub digest: Option<String>,
}

impl FileCheck {
    pub fn missing() -> Self {
        Self {
            exists: false,
            size: 0,
            language: None,
            lines: 0,
            digest: None,
        }
    }
}

/// Shown per severity in [`VerificationResult::summary`].
pub const SUMMARY_LIMIT: usize = 10;

/// Outcome of one verification call.
///
/// `issues` holds errors and info entries, `warnings` holds warnings.
/// `passed` is true exactly when no issue has error severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub issues: Vec<VerificationIssue>,
    pub warnings: Vec<VerificationIssue>,
    pub file_checks: BTreeMap<String, FileCheck>,
    pub guidance: Guidance,
}

impl VerificationResult {
    pub fn critical_errors(&self) -> Vec<&VerificationIssue> {
        self.issues.iter().filter(|i| i.is_error()).collect()
    }

    pub fn auto_fixable_errors(&self) -> Vec<&VerificationIssue> {
        self.issues
            .iter()
            .filter(|i| i.is_error() && i.auto_fixable)
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    /// Every issue regardless of severity, errors first.
    pub fn all_issues(&self) -> Vec<&VerificationIssue> {
        let mut all: Vec<&VerificationIssue> =
            self.issues.iter().chain(self.warnings.iter()).collect();
        all.sort_by_key(|i| i.severity);
        all
    }

    pub fn issues_in_layer(&self, layer: Layer) -> Vec<&VerificationIssue> {
        self.all_issues()
            .into_iter()
            .filter(|i| i.layer == layer)
            .collect()
    }

    /// Severity-ranked, length-capped human-readable summary.
    pub fn summary(&self) -> String {
        let errors = self.critical_errors();
        let infos: Vec<&VerificationIssue> = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Info)
            .collect();

        let mut out = String::new();
        out.push_str(if self.passed { "PASSED\n" } else { "FAILED\n" });
        out.push_str(&format!("Critical Errors: {}\n", errors.len()));
        out.push_str(&format!("Warnings: {}\n", self.warnings.len()));
        if !infos.is_empty() {
            out.push_str(&format!("Info: {}\n", infos.len()));
        }

        let sections: [(&str, Vec<&VerificationIssue>); 3] = [
            ("Critical Errors", errors),
            ("Warnings", self.warnings.iter().collect()),
            ("Info", infos),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("\n=== {title} ===\n"));
            for issue in items.iter().take(SUMMARY_LIMIT) {
                out.push_str(&format!("{issue}\n"));
            }
            if items.len() > SUMMARY_LIMIT {
                out.push_str(&format!("... and {} more\n", items.len() - SUMMARY_LIMIT));
            }
        }
        out
    }
}
