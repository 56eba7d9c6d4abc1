//! Stylesheets: brace balance, selector heads and declared classes.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use response_extract::syntax::{bracket_balance, BracketKind, Dialect};

use super::{Diagnostic, FileAnalysis};
use crate::symbols::{StyleFacts, SymbolEntry};

struct Patterns {
    comment: Regex,
    head: Regex,
    class: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        comment: Regex::new(r"(?s)/\*.*?\*/").expect("comment pattern is valid"),
        head: Regex::new(r"([^{};]+)\{").expect("selector pattern is valid"),
        class: Regex::new(r"\.(-?[_a-zA-Z][\w-]*)").expect("class pattern is valid"),
    })
}

pub fn analyze(source: &str) -> FileAnalysis {
    let p = patterns();
    let mut diagnostics = Vec::new();

    let balance = bracket_balance(source, Dialect::Css);
    if balance.delta(BracketKind::Brace) != 0 {
        let delta = balance.delta(BracketKind::Brace);
        let side = if delta > 0 { "opening" } else { "closing" };
        diagnostics.push(Diagnostic::error(format!(
            "Unbalanced braces in CSS: {} extra {side} braces",
            delta.abs()
        )));
    }

    let stripped = p.comment.replace_all(source, |_: &Captures<'_>| String::new());
    let mut facts = StyleFacts::default();
    for caps in p.head.captures_iter(&stripped) {
        let head = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
        if head.is_empty() || head.starts_with('@') {
            continue;
        }
        facts
            .classes
            .extend(p.class.captures_iter(&head).map(|c| c[1].to_string()));
        facts.selectors.push(head);
    }

    FileAnalysis {
        entry: Some(SymbolEntry::Style(facts)),
        diagnostics,
    }
}
