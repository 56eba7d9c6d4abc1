//! Format-specific handling of raw response text: reasoning removal,
//! fenced-block selection and discourse cleanup.

use std::sync::OnceLock;

use regex::Regex;

use crate::language::Language;

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*([\w+#.-]*)[ \t]*\r?\n(.*?)\r?\n[ \t]*```")
            .expect("fence pattern is valid")
    })
}

/// Build one matcher per reasoning tag.
pub(crate) fn reasoning_patterns(tags: &[String]) -> Vec<Regex> {
    tags.iter()
        .filter_map(|tag| {
            let tag = regex::escape(tag.trim());
            let pattern = format!(r"(?is)<\s*{tag}(?:\s[^>]*)?>.*?<\s*/\s*{tag}\s*>");
            match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(tag = %tag, error = %e, "skipping reasoning tag");
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn strip_reasoning(content: &str, patterns: &[Regex]) -> String {
    let mut out = content.to_string();
    for re in patterns {
        if re.is_match(&out) {
            out = re.replace_all(&out, "").into_owned();
        }
    }
    out
}

/// Bodies of fenced blocks whose tag is empty or an alias of `language`.
pub(crate) fn fenced_blocks(content: &str, language: Option<Language>) -> Vec<String> {
    fence_regex()
        .captures_iter(content)
        .filter(|caps| {
            let tag = caps.get(1).map_or("", |m| m.as_str());
            match language {
                None => true,
                Some(lang) => {
                    tag.is_empty()
                        || lang
                            .fence_aliases()
                            .contains(&tag.to_ascii_lowercase().as_str())
                }
            }
        })
        .filter_map(|caps| caps.get(2).map(|m| m.as_str().trim().to_string()))
        .filter(|body| !body.is_empty())
        .collect()
}

pub(crate) fn remove_fenced_blocks(content: &str) -> String {
    fence_regex().replace_all(content, "").into_owned()
}

const FUNCTION_MARKERS: &[&str] = &["def ", "function ", "fn ", "func "];
const CLASS_MARKERS: &[&str] = &["class ", "interface ", "struct "];
const ENTRY_GUARDS: &[&str] = &["if __name__", "require.main === module"];
const EXPLANATORY_MARKERS: &[&str] = &["# Example", "# Usage", "// Example", "// Usage"];
const DOC_MARKERS: &[&str] = &["\"\"\"", "'''", "/**"];

/// Heuristic score preferring definitions, documentation and size over demo snippets.
pub fn score_block(code: &str) -> i64 {
    let has_any = |markers: &[&str]| markers.iter().any(|m| code.contains(m));
    let mut score = 0i64;
    if has_any(FUNCTION_MARKERS) {
        score += 20;
    }
    if has_any(CLASS_MARKERS) {
        score += 20;
    }
    if has_any(ENTRY_GUARDS) {
        score -= 10;
    }
    if has_any(EXPLANATORY_MARKERS) {
        score -= 5;
    }
    score += (code.len() as i64 / 10).min(50);
    if has_any(DOC_MARKERS) {
        score += 10;
    }
    score
}

/// Highest-scoring block; ties keep the earliest.
pub(crate) fn select_best_block(blocks: Vec<String>) -> Option<String> {
    let mut best: Option<(i64, String)> = None;
    for block in blocks {
        let score = score_block(&block);
        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, block));
        }
    }
    best.map(|(_, block)| block)
}

const DISCOURSE_PREFIXES: &[&str] = &[
    "Here",
    "This",
    "The function",
    "The code",
    "Note:",
    "Example:",
    "Usage:",
];
const CODE_STARTS: &[&str] = &[
    "def ", "class ", "import ", "from ", "async def ", "function ", "const ", "let ", "export ",
];
const PRELUDE_COMMENTS: &[&str] = &["#", "\"\"\"", "'''", "//"];

/// Drop leading discourse lines until something code-like appears.
pub(crate) fn clean_raw_code(content: &str) -> String {
    let mut kept = Vec::new();
    let mut in_code = false;

    for line in content.lines() {
        let stripped = line.trim();
        if !in_code && DISCOURSE_PREFIXES.iter().any(|p| stripped.starts_with(p)) {
            continue;
        }
        if CODE_STARTS.iter().any(|p| stripped.starts_with(p)) {
            in_code = true;
        }
        if in_code || PRELUDE_COMMENTS.iter().any(|p| stripped.starts_with(p)) {
            kept.push(line);
        }
    }

    let cleaned = kept.join("\n");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        content.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_patterns() -> Vec<Regex> {
        reasoning_patterns(&["think".to_string(), "思考".to_string()])
    }

    #[test]
    fn test_strip_reasoning_multiline_and_attributes() {
        let text = "<think>\nplan the\nanswer\n</think>Answer <THINK id=\"2\">more</THINK>done <思考>内部</思考>";
        let out = strip_reasoning(text, &default_patterns());
        assert_eq!(out, "Answer done ");
    }

    #[test]
    fn test_fence_requires_newline_after_tag() {
        assert!(fenced_blocks("inline ```python code``` here", Some(Language::Python)).is_empty());
        let blocks = fenced_blocks("```py\nx = 1\n```", Some(Language::Python));
        assert_eq!(blocks, vec!["x = 1".to_string()]);
    }

    #[test]
    fn test_fence_language_filter() {
        let text = "```js\nlet a = 1;\n```\n```\nb = 2\n```\n```python\nc = 3\n```";
        let py = fenced_blocks(text, Some(Language::Python));
        assert_eq!(py, vec!["b = 2".to_string(), "c = 3".to_string()]);
        assert_eq!(fenced_blocks(text, None).len(), 3);
    }

    #[test]
    fn test_scoring_prefers_definitions_over_usage() {
        let usage = "# Usage\nresult = add(1, 2)\nprint(result)";
        let def = "def add(a, b):\n    return a + b";
        assert!(score_block(def) > score_block(usage));
        let picked = select_best_block(vec![usage.to_string(), def.to_string()]);
        assert_eq!(picked.as_deref(), Some(def));
    }

    #[test]
    fn test_ties_keep_first_block() {
        let picked = select_best_block(vec!["x = 1".to_string(), "y = 2".to_string()]);
        assert_eq!(picked.as_deref(), Some("x = 1"));
    }

    #[test]
    fn test_clean_raw_code_drops_preamble() {
        let raw = "Here is the code you asked for:\n\n# helper\ndef f():\n    return 1";
        assert_eq!(clean_raw_code(raw), "# helper\ndef f():\n    return 1");

        let prose = "Nothing code-like here";
        assert_eq!(clean_raw_code(prose), "Nothing code-like here");
    }
}
