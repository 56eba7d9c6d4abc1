//! HTML markup: an event-style tag scan that records references, handler
//! calls, class/id usage and form wiring.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{line_at, Diagnostic, FileAnalysis};
use crate::symbols::{FormFacts, HandlerCall, MarkupFacts, ScriptTag, StylesheetLink, SymbolEntry};

struct Patterns {
    comment: Regex,
    script_body: Regex,
    style_body: Regex,
    tag: Regex,
    attr: Regex,
    call: Regex,
    doctype: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        comment: Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"),
        script_body: Regex::new(r"(?is)(<script\b[^>]*>)(.*?)(</script\s*>)")
            .expect("script pattern is valid"),
        style_body: Regex::new(r"(?is)(<style\b[^>]*>)(.*?)(</style\s*>)")
            .expect("style pattern is valid"),
        tag: Regex::new(r#"<(/?)([a-zA-Z][\w:-]*)((?:"[^"]*"|'[^']*'|[^'">])*)>"#)
            .expect("tag pattern is valid"),
        attr: Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#)
            .expect("attribute pattern is valid"),
        call: Regex::new(r"([A-Za-z_$][\w$]*)\s*\(").expect("call pattern is valid"),
        doctype: Regex::new(r"(?i)<!DOCTYPE\s+html").expect("doctype pattern is valid"),
    })
}

/// Words that look like calls inside handler attributes but are not functions.
const NON_CALLS: &[&str] = &[
    "if", "for", "while", "switch", "return", "function", "typeof", "catch", "new", "void",
    "alert", "confirm", "prompt", "setTimeout", "setInterval", "clearTimeout",
    "clearInterval", "parseInt", "parseFloat", "Number", "String", "Boolean", "fetch",
];

/// Replace matched text with its newlines only, keeping line numbers stable.
fn blank(text: &str) -> String {
    text.chars().filter(|&c| c == '\n').collect()
}

/// Remove comments and raw-text element bodies without shifting lines.
fn mask(source: &str) -> String {
    let p = patterns();
    let masked = p.comment.replace_all(source, |caps: &Captures<'_>| blank(&caps[0]));
    let keep_tags = |caps: &Captures<'_>| format!("{}{}{}", &caps[1], blank(&caps[2]), &caps[3]);
    let masked = p.script_body.replace_all(&masked, keep_tags);
    p.style_body.replace_all(&masked, keep_tags).into_owned()
}

fn attributes(raw: &str) -> HashMap<String, String> {
    patterns()
        .attr
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str())
                .to_string();
            Some((name, value))
        })
        .collect()
}

pub fn analyze(source: &str) -> FileAnalysis {
    let p = patterns();
    let masked = mask(source);
    let mut facts = MarkupFacts {
        has_doctype: p.doctype.is_match(source),
        ..MarkupFacts::default()
    };
    let mut open_form: Option<usize> = None;

    for caps in p.tag.captures_iter(&masked) {
        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        let line = line_at(&masked, caps.get(0).map_or(0, |m| m.start()));

        if closing {
            if name == "form" {
                open_form = None;
            }
            continue;
        }

        let attrs = attributes(&caps[3]);
        let attr = |key: &str| attrs.get(key).map(String::as_str).filter(|v| !v.trim().is_empty());

        match name.as_str() {
            "script" => facts.script_tags.push(ScriptTag {
                src: attr("src").map(str::to_string),
                is_module: attr("type").is_some_and(|t| t.eq_ignore_ascii_case("module")),
                line,
            }),
            "link" => {
                let is_stylesheet = attr("rel").is_some_and(|rel| {
                    rel.split_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("stylesheet"))
                });
                if let (true, Some(href)) = (is_stylesheet, attr("href")) {
                    facts.stylesheets.push(StylesheetLink {
                        href: href.to_string(),
                        line,
                    });
                }
            }
            "img" => facts.images.extend(attr("src").map(str::to_string)),
            "form" => {
                facts.forms.push(FormFacts {
                    id: attr("id").map(str::to_string),
                    has_inline_submit_handler: attr("onsubmit").is_some(),
                    has_submit_control: false,
                    line,
                });
                open_form = Some(facts.forms.len() - 1);
            }
            "button" | "input" => {
                let kind = attr("type").map(str::to_ascii_lowercase);
                let submits = match name.as_str() {
                    "button" => matches!(kind.as_deref(), None | Some("submit")),
                    _ => matches!(kind.as_deref(), Some("submit") | Some("image")),
                };
                if let (true, Some(idx)) = (submits, open_form) {
                    facts.forms[idx].has_submit_control = true;
                }
            }
            _ => {}
        }

        for key in ["class", "id"] {
            if let Some(value) = attr(key) {
                facts
                    .used_tokens
                    .extend(value.split_whitespace().map(str::to_string));
            }
        }

        let mut handler_attrs: Vec<(&String, &String)> =
            attrs.iter().filter(|(k, _)| k.starts_with("on")).collect();
        handler_attrs.sort();
        for (attribute, value) in handler_attrs {
            for call in p.call.captures_iter(value) {
                let Some(m) = call.get(1) else { continue };
                let callee = m.as_str();
                // Method calls like `event.preventDefault()` are not handler lookups.
                let after_dot = value[..m.start()].ends_with('.');
                if after_dot || NON_CALLS.contains(&callee) {
                    continue;
                }
                facts.handlers.push(HandlerCall {
                    name: callee.to_string(),
                    attribute: attribute.clone(),
                    line,
                });
            }
        }
    }

    let doctype_warning = (!facts.has_doctype)
        .then(|| Diagnostic::warning("Missing DOCTYPE declaration").at_line(Some(1)));
    FileAnalysis::facts(SymbolEntry::Markup(facts)).with(doctype_warning)
}
