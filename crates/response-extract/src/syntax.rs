//! Lightweight syntax checks: bracket balance and real parsers where we have them.
//!
//! Python goes through tree-sitter, JSON through serde_json. Everything else
//! gets a string- and comment-aware bracket balance scan.

use std::cell::RefCell;

use tree_sitter::{Node, Parser, Tree};

use crate::error::{ExtractionError, Result};
use crate::language::Language;

/// Comment and string conventions used while scanning for brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `//` and `/* */` comments, backtick template strings.
    CLike,
    /// `/* */` comments only.
    Css,
    /// `#` comments, triple-quoted strings.
    Hash,
    /// Quotes only, no comment syntax.
    Plain,
}

impl Dialect {
    pub fn for_language(language: Option<Language>) -> Self {
        match language {
            Some(Language::Python) | Some(Language::Yaml) => Self::Hash,
            Some(Language::Css) => Self::Css,
            Some(lang) if lang.is_script() => Self::CLike,
            _ => Self::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Brace,
    Paren,
    Square,
}

impl BracketKind {
    pub const ALL: [BracketKind; 3] = [Self::Brace, Self::Paren, Self::Square];

    pub fn plural(self) -> &'static str {
        match self {
            Self::Brace => "braces",
            Self::Paren => "parentheses",
            Self::Square => "brackets",
        }
    }
}

/// Net opening-minus-closing counts per bracket kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BracketBalance {
    pub braces: i64,
    pub parens: i64,
    pub squares: i64,
    pub unclosed_quote: bool,
}

impl BracketBalance {
    pub fn delta(&self, kind: BracketKind) -> i64 {
        match kind {
            BracketKind::Brace => self.braces,
            BracketKind::Paren => self.parens,
            BracketKind::Square => self.squares,
        }
    }

    pub fn brackets_balanced(&self) -> bool {
        self.braces == 0 && self.parens == 0 && self.squares == 0
    }

    pub fn is_balanced(&self) -> bool {
        self.brackets_balanced() && !self.unclosed_quote
    }

    /// Human-readable imbalance for one kind, e.g. `Unbalanced braces: 1 extra opening braces`.
    pub fn imbalance(&self, kind: BracketKind) -> Option<String> {
        let delta = self.delta(kind);
        if delta == 0 {
            return None;
        }
        let side = if delta > 0 { "opening" } else { "closing" };
        Some(format!(
            "Unbalanced {}: {} extra {} {}",
            kind.plural(),
            delta.abs(),
            side,
            kind.plural()
        ))
    }

    pub fn imbalances(&self) -> Vec<String> {
        BracketKind::ALL
            .into_iter()
            .filter_map(|kind| self.imbalance(kind))
            .collect()
    }
}

/// Count brackets outside of strings and comments.
pub fn bracket_balance(source: &str, dialect: Dialect) -> BracketBalance {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut balance = BracketBalance::default();
    let mut i = 0;

    while i < len {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '/' if next == Some('/') && dialect == Dialect::CLike => {
                i = skip_line(&chars, i);
                continue;
            }
            '/' if next == Some('*') && matches!(dialect, Dialect::CLike | Dialect::Css) => {
                i = find_seq(&chars, i + 2, &['*', '/']).map_or(len, |end| end + 2);
                continue;
            }
            '#' if dialect == Dialect::Hash => {
                i = skip_line(&chars, i);
                continue;
            }
            '"' | '\'' => {
                if dialect == Dialect::Hash && next == Some(c) && chars.get(i + 2) == Some(&c) {
                    match find_seq(&chars, i + 3, &[c, c, c]) {
                        Some(end) => i = end + 3,
                        None => {
                            balance.unclosed_quote = true;
                            i = len;
                        }
                    }
                    continue;
                }
                let (end, closed) = scan_quoted(&chars, i + 1, c, false);
                if !closed {
                    balance.unclosed_quote = true;
                }
                i = end;
                continue;
            }
            '`' if dialect == Dialect::CLike => {
                let (end, closed) = scan_quoted(&chars, i + 1, '`', true);
                if !closed {
                    balance.unclosed_quote = true;
                }
                i = end;
                continue;
            }
            '{' => balance.braces += 1,
            '}' => balance.braces -= 1,
            '(' => balance.parens += 1,
            ')' => balance.parens -= 1,
            '[' => balance.squares += 1,
            ']' => balance.squares -= 1,
            _ => {}
        }
        i += 1;
    }

    balance
}

fn skip_line(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |off| from + off)
}

fn find_seq(chars: &[char], from: usize, seq: &[char]) -> Option<usize> {
    if from >= chars.len() {
        return None;
    }
    chars[from..]
        .windows(seq.len())
        .position(|w| w == seq)
        .map(|off| from + off)
}

/// Returns the index after the closing quote and whether the quote was closed.
fn scan_quoted(chars: &[char], mut i: usize, quote: char, multiline: bool) -> (usize, bool) {
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return (i + 1, true),
            '\n' if !multiline => return (i + 1, false),
            _ => i += 1,
        }
    }
    (chars.len(), false)
}

/// True when code looks cut off mid-way (any bracket kind or a quote left open).
pub fn looks_truncated(code: &str, language: Option<Language>) -> bool {
    !bracket_balance(code, Dialect::for_language(language)).is_balanced()
}

/// A syntax problem with an optional 1-based line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    pub line: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "Syntax error at line {line}: {}", self.message),
            None => write!(f, "Syntax error: {}", self.message),
        }
    }
}

thread_local! {
    static PYTHON_PARSER: RefCell<Option<Parser>> = RefCell::new(new_python_parser());
}

fn new_python_parser() -> Option<Parser> {
    let mut parser = Parser::new();
    match parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
        Ok(()) => Some(parser),
        Err(e) => {
            tracing::error!(error = %e, "failed to load python grammar");
            None
        }
    }
}

/// Parse Python source, failing on the first error or missing node.
pub fn parse_python(source: &str) -> std::result::Result<Tree, SyntaxIssue> {
    let tree = PYTHON_PARSER
        .with(|cell| {
            cell.borrow_mut()
                .as_mut()
                .and_then(|parser| parser.parse(source, None))
        })
        .ok_or_else(|| SyntaxIssue {
            line: None,
            message: "python parser unavailable".to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(first_error(root, source));
    }
    if let Some(issue) = legacy_statement(root) {
        return Err(issue);
    }
    check_indentation(source)?;
    Ok(tree)
}

/// Python 2 `print x` / `exec code` statements, which the grammar still accepts.
fn legacy_statement(root: Node<'_>) -> Option<SyntaxIssue> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let keyword = match node.kind() {
            "print_statement" => Some("print"),
            "exec_statement" => Some("exec"),
            _ => None,
        };
        if let Some(keyword) = keyword {
            return Some(SyntaxIssue {
                line: Some(node.start_position().row + 1),
                message: format!("Missing parentheses in call to '{keyword}'"),
            });
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Width of leading whitespace, tabs advancing to the next multiple of 8.
fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .fold(0, |width, c| if c == '\t' { (width / 8 + 1) * 8 } else { width + 1 })
}

/// Reject dedents that land between enclosing indentation levels.
///
/// Only lines that start a logical line count: continuation lines inside
/// brackets, triple-quoted strings or after a trailing backslash are skipped.
fn check_indentation(source: &str) -> std::result::Result<(), SyntaxIssue> {
    let mut levels = vec![0usize];
    let mut depth: i32 = 0;
    let mut open_triple: Option<[char; 3]> = None;
    let mut continued = false;

    for (idx, line) in source.lines().enumerate() {
        let body = line.trim_start_matches([' ', '\t']);
        let logical_start = depth <= 0 && open_triple.is_none() && !continued;
        if logical_start && !body.is_empty() && !body.starts_with('#') {
            let width = indent_width(line);
            let top = levels.last().copied().unwrap_or(0);
            if width > top {
                levels.push(width);
            } else if width < top {
                while levels.last().is_some_and(|&level| level > width) {
                    levels.pop();
                }
                if levels.last() != Some(&width) {
                    return Err(SyntaxIssue {
                        line: Some(idx + 1),
                        message: "unindent does not match any outer indentation level".to_string(),
                    });
                }
            }
        }

        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        continued = false;
        while i < chars.len() {
            if let Some(triple) = open_triple {
                match find_seq(&chars, i, &triple) {
                    Some(end) => {
                        open_triple = None;
                        i = end + 3;
                    }
                    None => i = chars.len(),
                }
                continue;
            }
            match chars[i] {
                '#' => break,
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                q @ ('"' | '\'') => {
                    let triple = [q, q, q];
                    if chars[i..].starts_with(&triple) {
                        open_triple = Some(triple);
                        i += 3;
                        continue;
                    }
                    i = scan_quoted(&chars, i + 1, q, false).0;
                    continue;
                }
                '\\' if i + 1 == chars.len() => continued = true,
                _ => {}
            }
            i += 1;
        }
    }
    Ok(())
}

fn first_error(root: Node<'_>, source: &str) -> SyntaxIssue {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_missing() {
            return SyntaxIssue {
                line: Some(node.start_position().row + 1),
                message: format!("missing '{}'", node.kind()),
            };
        }
        if node.is_error() {
            let snippet = node
                .utf8_text(source.as_bytes())
                .unwrap_or("")
                .lines()
                .next()
                .unwrap_or("")
                .trim();
            let snippet: String = snippet.chars().take(40).collect();
            return SyntaxIssue {
                line: Some(node.start_position().row + 1),
                message: if snippet.is_empty() {
                    "invalid syntax".to_string()
                } else {
                    format!("invalid syntax near '{snippet}'")
                },
            };
        }
        // Only descend into subtrees that contain the error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return SyntaxIssue {
                    line: None,
                    message: "invalid syntax".to_string(),
                };
            }
        }
    }
}

/// Parse JSON, reporting serde_json's line on failure.
pub fn check_json(source: &str) -> std::result::Result<(), SyntaxIssue> {
    serde_json::from_str::<serde_json::Value>(source)
        .map(|_| ())
        .map_err(|e| SyntaxIssue {
            line: Some(e.line()).filter(|&l| l > 0),
            message: format!("Invalid JSON: {e}"),
        })
}

/// Check that extracted code parses for its language.
pub fn validate(code: &str, language: Option<Language>) -> Result<()> {
    if code.trim().is_empty() {
        return Err(ExtractionError::validation("no code to validate", code));
    }
    let outcome = match language {
        Some(Language::Python) => parse_python(code).map(|_| ()),
        Some(Language::Json) => check_json(code),
        other => {
            let balance = bracket_balance(code, Dialect::for_language(other));
            let mut problems = balance.imbalances();
            if balance.unclosed_quote {
                problems.push("unterminated string literal".to_string());
            }
            if problems.is_empty() {
                Ok(())
            } else {
                Err(SyntaxIssue {
                    line: None,
                    message: problems.join("; "),
                })
            }
        }
    };
    outcome.map_err(|issue| ExtractionError::validation(issue.to_string(), code))
}
