//! Per-call symbol table: one tagged record per analysed file.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Imports and top-level definitions of a fully parsed source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFacts {
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

/// Facts from a brace-delimited script analysed by pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFacts {
    pub imports: Vec<String>,
    /// Function-like definitions (named, assigned function, assigned arrow).
    pub exports: Vec<String>,
    pub has_es6_exports: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTag {
    pub src: Option<String>,
    pub is_module: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylesheetLink {
    pub href: String,
    pub line: usize,
}

/// A bare function call found inside an `on*` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerCall {
    pub name: String,
    pub attribute: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFacts {
    pub id: Option<String>,
    pub has_inline_submit_handler: bool,
    pub has_submit_control: bool,
    pub line: usize,
}

impl FormFacts {
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("'{id}'"),
            None => format!("at line {}", self.line),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupFacts {
    /// Every `<script>` element in document order, inline ones included.
    pub script_tags: Vec<ScriptTag>,
    pub stylesheets: Vec<StylesheetLink>,
    pub images: Vec<String>,
    pub handlers: Vec<HandlerCall>,
    /// Union of class and id tokens used anywhere in the document.
    pub used_tokens: BTreeSet<String>,
    pub forms: Vec<FormFacts>,
    pub has_doctype: bool,
}

impl MarkupFacts {
    /// Script tags that reference an external file.
    pub fn script_refs(&self) -> impl Iterator<Item = (&ScriptTag, &str)> {
        self.script_tags
            .iter()
            .filter_map(|tag| tag.src.as_deref().map(|src| (tag, src)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFacts {
    /// Selector heads in source order.
    pub selectors: Vec<String>,
    /// Class names declared by any selector.
    pub classes: BTreeSet<String>,
}

/// Extracted facts, one variant per language family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum SymbolEntry {
    Python(CodeFacts),
    Script(ScriptFacts),
    Markup(MarkupFacts),
    Style(StyleFacts),
    /// Strict object-notation data that parsed cleanly.
    Data,
}

/// Path to facts for one verification call. Never reused across file sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    entries: BTreeMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn insert(&mut self, path: impl Into<String>, entry: SymbolEntry) {
        self.entries.insert(path.into(), entry);
    }

    pub fn get(&self, path: &str) -> Option<&SymbolEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn script(&self, path: &str) -> Option<&ScriptFacts> {
        match self.entries.get(path) {
            Some(SymbolEntry::Script(facts)) => Some(facts),
            _ => None,
        }
    }

    pub fn style(&self, path: &str) -> Option<&StyleFacts> {
        match self.entries.get(path) {
            Some(SymbolEntry::Style(facts)) => Some(facts),
            _ => None,
        }
    }

    pub fn markup_files(&self) -> impl Iterator<Item = (&str, &MarkupFacts)> {
        self.iter().filter_map(|(path, entry)| match entry {
            SymbolEntry::Markup(facts) => Some((path, facts)),
            _ => None,
        })
    }

    pub fn python_files(&self) -> impl Iterator<Item = (&str, &CodeFacts)> {
        self.iter().filter_map(|(path, entry)| match entry {
            SymbolEntry::Python(facts) => Some((path, facts)),
            _ => None,
        })
    }
}
