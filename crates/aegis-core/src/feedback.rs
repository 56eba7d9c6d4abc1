//! Normalize tool output and review text into [`Feedback`] items that can be
//! handed back to a generator.

use std::sync::OnceLock;

use code_verifier::{GuidanceTopic, Severity, VerificationIssue};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub severity: Severity,
    pub file_path: Option<String>,
    pub line: Option<usize>,
    pub message: String,
    pub suggested_fix: Option<String>,
}

impl Feedback {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            file_path: None,
            line: None,
            message: message.into(),
            suggested_fix: None,
        }
    }

    pub fn at(mut self, file_path: impl Into<String>, line: Option<usize>) -> Self {
        self.file_path = Some(file_path.into());
        self.line = line;
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// `` `path:line` - `` prefix, empty without a path.
    fn location(&self) -> String {
        match (&self.file_path, self.line) {
            (Some(path), Some(line)) => format!("`{path}:{line}` - "),
            (Some(path), None) => format!("`{path}` - "),
            _ => String::new(),
        }
    }
}

impl From<&VerificationIssue> for Feedback {
    fn from(issue: &VerificationIssue) -> Self {
        let feedback = Feedback::new(issue.severity, issue.message.clone())
            .at(issue.file_path.clone(), issue.line);
        if issue.auto_fixable {
            feedback.with_fix(GuidanceTopic::classify(&issue.message).tip())
        } else {
            feedback
        }
    }
}

struct Patterns {
    pytest_failed: Regex,
    assertion: Regex,
    file_line: Regex,
    pylint: Regex,
    mypy: Regex,
    review: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        pytest_failed: Regex::new(r"([\w/.-]+\.py)::(\w+)\s+FAILED")
            .expect("pytest failure pattern is valid"),
        assertion: Regex::new(r"AssertionError: (.+)").expect("assertion pattern is valid"),
        file_line: Regex::new(r"([\w/.-]+\.py):(\d+):").expect("location pattern is valid"),
        pylint: Regex::new(r"([\w/.-]+\.py):(\d+):(\d+):\s+([CRWEF]\d+):\s+(.+)")
            .expect("pylint pattern is valid"),
        mypy: Regex::new(r"([\w/.-]+\.py):(\d+):\s+(error|warning|note):\s+(.+)")
            .expect("mypy pattern is valid"),
        review: Regex::new(r"\[(ERROR|WARNING|INFO)\]\s+([\w/.-]+\.\w+):(\d+)\s+-\s+(.+)")
            .expect("review pattern is valid"),
    })
}

fn line_number(text: &str) -> Option<usize> {
    text.parse().ok()
}

/// Failed test ids, assertion messages and `file.py:N:` locations.
pub fn parse_pytest_output(output: &str) -> Vec<Feedback> {
    let p = patterns();
    let mut feedback = Vec::new();

    for caps in p.pytest_failed.captures_iter(output) {
        let (file, test) = (&caps[1], &caps[2]);
        feedback.push(
            Feedback::new(Severity::Error, format!("Test '{test}' failed in {file}")).at(file, None),
        );
    }
    for caps in p.assertion.captures_iter(output) {
        feedback.push(Feedback::new(
            Severity::Error,
            format!("Assertion failed: {}", caps[1].trim_end()),
        ));
    }
    for caps in p.file_line.captures_iter(output) {
        let (file, line) = (&caps[1], &caps[2]);
        feedback.push(
            Feedback::new(Severity::Error, format!("Error at {file}:{line}"))
                .at(file, line_number(line)),
        );
    }
    feedback
}

/// `file:line:col: CODE: message`; E/F codes are errors, W warnings, the rest info.
pub fn parse_pylint_output(output: &str) -> Vec<Feedback> {
    patterns()
        .pylint
        .captures_iter(output)
        .map(|caps| {
            let code = &caps[4];
            let severity = match code.as_bytes()[0] {
                b'E' | b'F' => Severity::Error,
                b'W' => Severity::Warning,
                _ => Severity::Info,
            };
            Feedback::new(severity, format!("{code}: {}", caps[5].trim_end()))
                .at(&caps[1], line_number(&caps[2]))
        })
        .collect()
}

/// `file:line: error|warning|note: message`.
pub fn parse_mypy_output(output: &str) -> Vec<Feedback> {
    patterns()
        .mypy
        .captures_iter(output)
        .map(|caps| {
            let severity = match &caps[3] {
                "warning" => Severity::Warning,
                "note" => Severity::Info,
                _ => Severity::Error,
            };
            Feedback::new(severity, caps[4].trim_end()).at(&caps[1], line_number(&caps[2]))
        })
        .collect()
}

/// `[SEVERITY] file:line - message` comments from a reviewer, plus one
/// generic error when the review mentions a security problem.
pub fn parse_agent_review(review: &str) -> Vec<Feedback> {
    let mut feedback: Vec<Feedback> = patterns()
        .review
        .captures_iter(review)
        .map(|caps| {
            let severity = match &caps[1] {
                "ERROR" => Severity::Error,
                "WARNING" => Severity::Warning,
                _ => Severity::Info,
            };
            Feedback::new(severity, caps[4].trim_end()).at(&caps[2], line_number(&caps[3]))
        })
        .collect();

    let lower = review.to_lowercase();
    if lower.contains("security") || lower.contains("vulnerab") {
        feedback.push(Feedback::new(Severity::Error, "Security issue detected in code"));
    }
    feedback
}

/// Markdown summary grouped by severity, errors first.
pub fn format_for_agent(feedback: &[Feedback]) -> String {
    if feedback.is_empty() {
        return "No issues found.".to_string();
    }

    let mut out = vec!["## Feedback Summary\n".to_string()];
    for (severity, title) in [
        (Severity::Error, "Errors"),
        (Severity::Warning, "Warnings"),
        (Severity::Info, "Info"),
    ] {
        let items: Vec<&Feedback> = feedback.iter().filter(|f| f.severity == severity).collect();
        if items.is_empty() {
            continue;
        }
        out.push(format!("### {title}\n"));
        for item in items {
            out.push(format!("- {}{}", item.location(), item.message));
            if let Some(fix) = &item.suggested_fix {
                out.push(format!("  - **Fix:** {fix}"));
            }
        }
        out.push(String::new());
    }
    out.join("\n")
}
