use std::path::Path;

use code_verifier::{verify_generated_code, FileSpec, Layer, Severity, VerificationResult};

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("create dirs");
    }
    std::fs::write(full, content).expect("write file");
}

fn verify(root: &Path, paths: &[&str]) -> VerificationResult {
    let specs: Vec<FileSpec> = paths.iter().map(|p| FileSpec::new(*p, "generated")).collect();
    verify_generated_code(root, &specs).expect("verification runs")
}

fn errors_in(result: &VerificationResult, layer: Layer) -> Vec<String> {
    result
        .issues
        .iter()
        .filter(|i| i.layer == layer && i.is_error())
        .map(|i| i.message.clone())
        .collect()
}

#[test]
fn passed_iff_no_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "good.py", "def main():\n    return 1\n");
    write(dir.path(), "bad.py", "def broken(:\n    pass\n");

    let ok = verify(dir.path(), &["good.py"]);
    assert!(ok.passed);
    assert_eq!(ok.error_count(), 0);

    let bad = verify(dir.path(), &["good.py", "bad.py"]);
    assert!(!bad.passed);
    let static_errors = errors_in(&bad, Layer::Static);
    assert_eq!(static_errors.len(), 1);
    assert!(static_errors[0].starts_with("Python syntax error"));
    assert!(bad.issues.iter().all(|i| i.file_path == "bad.py"));
}

#[test]
fn each_missing_file_reports_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "present.js", "function ok() { return 1; }\n");

    let result = verify(dir.path(), &["present.js", "a.py", "nested/b.css"]);
    assert!(!result.passed);

    let missing: Vec<&str> = result
        .issues
        .iter()
        .filter(|i| i.message == "File does not exist")
        .map(|i| i.file_path.as_str())
        .collect();
    assert_eq!(missing, vec!["a.py", "nested/b.css"]);
    assert!(result.issues.iter().all(|i| i.layer == Layer::Structure));
    assert!(!result.file_checks["a.py"].exists);
    assert!(result.file_checks["present.js"].exists);
}

#[test]
fn empty_file_is_structural_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "empty.js", "\n   \n");

    let result = verify(dir.path(), &["empty.js"]);
    assert_eq!(errors_in(&result, Layer::Structure), vec!["File is empty"]);
    assert!(errors_in(&result, Layer::Static).is_empty());
}

#[test]
fn json_trailing_comma_reports_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "package.json",
        "{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\",\n}\n",
    );

    let result = verify(dir.path(), &["package.json"]);
    let errors: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.layer == Layer::Static && i.is_error())
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, Some(4));
    assert!(errors[0].message.starts_with("Invalid JSON"));
}

#[test]
fn unbalanced_script_is_static_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "app.js", "function run() {\n  if (ready) {\n    go();\n}\n");

    let result = verify(dir.path(), &["app.js"]);
    assert_eq!(
        errors_in(&result, Layer::Static),
        vec!["Unbalanced braces: 1 extra opening braces"]
    );
}

#[test]
fn unfinished_markers_and_doctype_are_warnings() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "index.html", "<html><body><p>hi</p></body></html>\n");
    write(dir.path(), "util.py", "def helper():\n    # FIXME: handle None\n    return 0\n");

    let result = verify(dir.path(), &["index.html", "util.py"]);
    assert!(result.passed, "{}", result.summary());
    let warnings: Vec<&str> = result.warnings.iter().map(|w| w.message.as_str()).collect();
    assert!(warnings.contains(&"Missing DOCTYPE declaration"));
    assert!(warnings.iter().any(|w| w.starts_with("File contains unfinished code markers")));
    assert!(result.warnings.iter().all(|w| w.severity == Severity::Warning));
}

#[test]
fn yaml_is_checked_structurally_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "config.yaml", "key: [unclosed\n");

    let result = verify(dir.path(), &["config.yaml"]);
    assert!(result.passed);
    assert!(result.file_checks["config.yaml"].exists);
}

#[test]
fn summary_lists_errors_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = verify(dir.path(), &["missing.py"]);
    let summary = result.summary();
    assert!(summary.starts_with("FAILED"));
    assert!(summary.contains("Critical Errors: 1"));
    assert!(summary.contains("ERROR: missing.py: File does not exist"));
}
