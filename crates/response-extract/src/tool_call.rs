//! Tier 1: code delivered through a tool invocation.
//!
//! Tool arguments are often truncated or slightly malformed JSON. Repair runs
//! in escalating steps: plain parse, structural repair, then a field-level
//! regex that pulls the code string out on its own.

use regex::Regex;
use serde_json::{Map, Value};

use crate::config::ExtractorConfig;
use crate::response::{ModelMessage, ToolArguments};

/// Result of inspecting a message's tool invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallTier {
    /// A code-bearing invocation yielded content.
    Hit(String),
    /// A code-bearing invocation existed but its arguments could not be recovered.
    Malformed { tool: String },
    /// No matching invocation.
    Miss,
}

impl ToolCallTier {
    pub fn into_option(self) -> Option<String> {
        match self {
            Self::Hit(code) => Some(code),
            _ => None,
        }
    }
}

/// Inspect the invocations of one message for a code payload.
pub fn tool_call_tier(message: &ModelMessage, config: &ExtractorConfig) -> ToolCallTier {
    let mut malformed: Option<String> = None;

    for call in &message.tool_calls {
        if !config
            .code_tools
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(call.name.trim()))
        {
            continue;
        }
        let code = match &call.arguments {
            ToolArguments::Map(map) => code_field(map, &config.code_parameters),
            ToolArguments::Text(raw) => match parse_arguments(raw) {
                Some(map) => code_field(&map, &config.code_parameters),
                None => regex_field(raw, &config.code_parameters),
            },
        };
        match code {
            Some(code) if !code.trim().is_empty() => {
                tracing::debug!(tool = %call.name, bytes = code.len(), "code extracted from tool call");
                return ToolCallTier::Hit(code);
            }
            _ => {
                tracing::warn!(tool = %call.name, "tool call carried no recoverable code");
                malformed.get_or_insert_with(|| call.name.clone());
            }
        }
    }

    match malformed {
        Some(tool) => ToolCallTier::Malformed { tool },
        None => ToolCallTier::Miss,
    }
}

fn code_field(map: &Map<String, Value>, params: &[String]) -> Option<String> {
    params
        .iter()
        .find_map(|key| map.get(key).and_then(Value::as_str).map(str::to_string))
}

/// Parse argument text as a JSON object, repairing it if needed.
pub fn parse_arguments(raw: &str) -> Option<Map<String, Value>> {
    let as_object = |text: &str| match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    };
    as_object(raw).or_else(|| {
        let repaired = repair_json(raw);
        let parsed = as_object(&repaired);
        if parsed.is_some() {
            tracing::debug!("tool arguments recovered by structural repair");
        }
        parsed
    })
}

/// Structural repair of a JSON object string.
pub fn repair_json(raw: &str) -> String {
    let mut text = strip_fences(raw.trim())
        .replace(['\u{201C}', '\u{201D}'], "\"");
    if let Some(start) = text.find('{') {
        text.drain(..start);
    }
    if let Some(end) = text.rfind('}') {
        text.truncate(end + 1);
    }

    let (depth, in_string) = scan_depth(&text);
    if in_string {
        text.push('"');
    }
    if depth > 0 {
        text.extend(std::iter::repeat('}').take(depth as usize));
    } else if depth < 0 {
        for _ in 0..depth.unsigned_abs() {
            match text.rfind('}') {
                Some(idx) => {
                    text.remove(idx);
                }
                None => break,
            }
        }
    }
    fix_json_issues(&text)
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Smart quotes and trailing commas, the two most common model slips.
fn fix_json_issues(text: &str) -> String {
    let text = text
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Net brace depth outside strings, and whether the text ends inside a string.
fn scan_depth(text: &str) -> (i64, bool) {
    let mut depth = 0i64;
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    (depth, in_string)
}

/// Last resort: pull a string field straight out of broken JSON text.
fn regex_field(raw: &str, params: &[String]) -> Option<String> {
    params.iter().find_map(|key| {
        let pattern = format!(r#""{}"\s*:\s*"((?:[^"\\]|\\.)*)"#, regex::escape(key));
        let re = Regex::new(&pattern).ok()?;
        let caps = re.captures(raw)?;
        let value = unescape_json(caps.get(1)?.as_str());
        tracing::debug!(field = %key, "tool argument recovered by field match");
        Some(value)
    })
}

fn unescape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
