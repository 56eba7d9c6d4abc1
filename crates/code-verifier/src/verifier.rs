//! Layer orchestration.
//!
//! Layer 1 runs on every declared file. Files that pass it are analysed
//! individually (Layer 2), and the resulting symbol table drives the
//! cross-file checks (Layer 3). All three layers always run; a failing file
//! simply contributes no facts downstream.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::analysis;
use crate::config::VerifierConfig;
use crate::error::{Result, VerifierError};
use crate::guidance::Guidance;
use crate::semantics::{self, FileSet};
use crate::structure;
use crate::symbols::SymbolTable;
use crate::types::{FileSpec, Layer, Severity, VerificationIssue, VerificationResult};

#[derive(Debug, Clone)]
pub struct CodeVerifier {
    root: PathBuf,
    config: VerifierConfig,
}

impl CodeVerifier {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: VerifierConfig::default(),
        }
    }

    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify the declared files under the root.
    ///
    /// Only an unusable root is an `Err`; everything wrong with the files
    /// themselves ends up in the returned result.
    pub fn verify(&self, files: &[FileSpec]) -> Result<VerificationResult> {
        if !self.root.is_dir() {
            return Err(VerifierError::RootNotFound(self.root.clone()));
        }
        let started = Instant::now();
        info!(
            event = "verify.started",
            root = %self.root.display(),
            files = files.len(),
        );

        let mut issues: Vec<VerificationIssue> = Vec::new();

        let layout = structure::check(&self.root, files);
        issues.extend(layout.issues);
        emit_layer_completed(Layer::Structure, &issues);

        let mut table = SymbolTable::default();
        for file in &layout.loaded {
            let Some(language) = file.language else {
                debug!(path = %file.path, "no analyser for file type");
                continue;
            };
            let Some(analysis) = analysis::analyze(language, &file.content, &self.config) else {
                continue;
            };
            issues.extend(analysis.diagnostics.into_iter().map(|d| {
                VerificationIssue::new(d.severity, Layer::Static, file.path.clone(), d.message)
                    .at_line(d.line)
            }));
            if let Some(entry) = analysis.entry {
                table.insert(file.path.clone(), entry);
            }
        }
        emit_layer_completed(Layer::Static, &issues);

        let file_set = FileSet {
            declared: layout.declared.iter().cloned().collect(),
            present: layout
                .checks
                .iter()
                .filter(|(_, check)| check.exists)
                .map(|(path, _)| path.clone())
                .collect(),
        };
        issues.extend(semantics::check(&table, &file_set, &self.config));
        emit_layer_completed(Layer::Semantic, &issues);

        let guidance = Guidance::from_issues(&issues);
        let (warnings, issues): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|i| i.severity == Severity::Warning);
        let result = VerificationResult {
            passed: !issues.iter().any(VerificationIssue::is_error),
            issues,
            warnings,
            file_checks: layout.checks.into_iter().collect(),
            guidance,
        };

        info!(
            event = "verify.finished",
            passed = result.passed,
            errors = result.error_count(),
            warnings = result.warnings.len(),
            duration_ms = started.elapsed().as_millis() as u64,
        );
        Ok(result)
    }
}

fn emit_layer_completed(layer: Layer, issues: &[VerificationIssue]) {
    let errors = issues
        .iter()
        .filter(|i| i.layer == layer && i.is_error())
        .count();
    debug!(event = "verify.layer_completed", layer = layer.number(), errors);
}

/// Verify `files` under `root` with the default configuration.
pub fn verify_generated_code(root: impl AsRef<Path>, files: &[FileSpec]) -> Result<VerificationResult> {
    CodeVerifier::new(root.as_ref()).verify(files)
}
