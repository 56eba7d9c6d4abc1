//! Layer 1: every declared file exists under the root and has content.

use std::path::Path;

use response_extract::Language;
use sha2::{Digest, Sha256};

use crate::resolve::normalize;
use crate::types::{FileCheck, FileSpec, Layer, VerificationIssue};

/// A declared file that passed Layer 1 and is handed to static analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    /// Root-relative, `/`-separated.
    pub path: String,
    pub language: Option<Language>,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct StructureReport {
    pub loaded: Vec<LoadedFile>,
    pub issues: Vec<VerificationIssue>,
    pub checks: Vec<(String, FileCheck)>,
    /// Normalized paths of every declared file, present or not.
    pub declared: Vec<String>,
}

pub fn check(root: &Path, files: &[FileSpec]) -> StructureReport {
    let mut report = StructureReport::default();
    for spec in files {
        let Some(path) = normalize(&spec.path).filter(|p| !p.is_empty()) else {
            report.issues.push(VerificationIssue::error(
                Layer::Structure,
                spec.path.clone(),
                "Path escapes verification root",
            ));
            continue;
        };
        report.declared.push(path.clone());

        let full = root.join(&path);
        if !full.is_file() {
            report.issues.push(VerificationIssue::error(
                Layer::Structure,
                path.clone(),
                "File does not exist",
            ));
            report.checks.push((path, FileCheck::missing()));
            continue;
        }

        let bytes = match std::fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) => {
                report.issues.push(VerificationIssue::error(
                    Layer::Structure,
                    path.clone(),
                    format!("Error reading file: {e}"),
                ));
                report.checks.push((path, FileCheck::missing()));
                continue;
            }
        };

        let content = String::from_utf8_lossy(&bytes).into_owned();
        let language = Language::from_path(&path);
        report.checks.push((
            path.clone(),
            FileCheck {
                exists: true,
                size: bytes.len(),
                language,
                lines: content.matches('\n').count() + 1,
                digest: Some(hex::encode(Sha256::digest(&bytes))),
            },
        ));

        if content.trim().is_empty() {
            report.issues.push(VerificationIssue::error(
                Layer::Structure,
                path,
                "File is empty",
            ));
            continue;
        }
        report.loaded.push(LoadedFile {
            path,
            language,
            content,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_one_outcomes() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").expect("write");
        std::fs::write(dir.path().join("blank.py"), "  \n\n").expect("write");

        let report = check(
            dir.path(),
            &[
                FileSpec::new("./main.py", "entry"),
                FileSpec::new("blank.py", "nothing"),
                FileSpec::new("gone.py", "missing"),
                FileSpec::new("../escape.py", "outside"),
            ],
        );

        let messages: Vec<(&str, &str)> = report
            .issues
            .iter()
            .map(|i| (i.file_path.as_str(), i.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![
                ("blank.py", "File is empty"),
                ("gone.py", "File does not exist"),
                ("../escape.py", "Path escapes verification root"),
            ]
        );
        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.loaded[0].path, "main.py");
        assert_eq!(report.loaded[0].language, Some(Language::Python));
        assert_eq!(report.declared, vec!["main.py", "blank.py", "gone.py"]);

        let (_, main) = &report.checks[0];
        assert_eq!(main.lines, 2);
        assert_eq!(main.digest.as_deref().map(str::len), Some(64));
        assert!(!report.checks[2].1.exists);
    }
}
