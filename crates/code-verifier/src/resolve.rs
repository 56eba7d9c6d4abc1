//! Reference resolution against the declared file set.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("scheme pattern is valid"))
}

/// Absolute URLs (`https:`, `data:`, ...) and protocol-relative `//host` references.
pub fn is_external(reference: &str) -> bool {
    let reference = reference.trim();
    reference.starts_with("//") || scheme_regex().is_match(reference)
}

/// Drop `?query` and `#fragment` suffixes.
pub fn strip_query(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}

/// Normalize a relative path: unify separators, drop `.` and leading `/`,
/// fold `..`. Returns `None` when the path climbs above the root.
pub fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.trim().split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Directory portion of a normalized path, empty for root-level files.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    External,
    Local(String),
    Unresolved,
}

/// Resolves markup references through ordered candidates: as given, relative
/// to the referencing file, then under the source root.
#[derive(Debug)]
pub struct Resolver<'a> {
    declared: &'a BTreeSet<String>,
    source_root: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(declared: &'a BTreeSet<String>, source_root: &'a str) -> Self {
        Self {
            declared,
            source_root,
        }
    }

    pub fn resolve(&self, from_file: &str, reference: &str) -> Resolution {
        if is_external(reference) {
            return Resolution::External;
        }
        let reference = strip_query(reference.trim());
        if reference.is_empty() {
            return Resolution::Unresolved;
        }

        let dir = parent_dir(from_file);
        let candidates = [
            normalize(reference),
            normalize(&format!("{dir}/{reference}")),
            normalize(&format!("{}/{reference}", self.source_root)),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|candidate| self.declared.contains(candidate))
            .map_or(Resolution::Unresolved, Resolution::Local)
    }
}
