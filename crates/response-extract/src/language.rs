//! Language table shared by extraction and verification.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source languages recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Python,
    JavaScript,
    Jsx,
    TypeScript,
    Html,
    Css,
    Json,
    Yaml,
}

impl Language {
    /// Map a file extension (without the dot, any case) to a language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Self::Python),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Jsx),
            "ts" | "tsx" => Some(Self::TypeScript),
            "html" | "htm" => Some(Self::Html),
            "css" => Some(Self::Css),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Resolve a markdown fence tag (`py`, `python`, `js`, ...) to a language.
    pub fn from_fence_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        [
            Self::Python,
            Self::JavaScript,
            Self::Jsx,
            Self::TypeScript,
            Self::Html,
            Self::Css,
            Self::Json,
            Self::Yaml,
        ]
        .into_iter()
        .find(|lang| lang.fence_aliases().contains(&tag.as_str()))
    }

    /// Equivalent spellings accepted after an opening code fence.
    pub fn fence_aliases(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["python", "py", "python3"],
            Self::JavaScript => &["javascript", "js", "mjs"],
            Self::Jsx => &["jsx"],
            Self::TypeScript => &["typescript", "ts", "tsx"],
            Self::Html => &["html", "htm"],
            Self::Css => &["css"],
            Self::Json => &["json"],
            Self::Yaml => &["yaml", "yml"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Jsx => "jsx",
            Self::TypeScript => "typescript",
            Self::Html => "html",
            Self::Css => "css",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Brace-delimited scripting languages analysed without a full parser.
    pub fn is_script(self) -> bool {
        matches!(self, Self::JavaScript | Self::Jsx | Self::TypeScript)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(Language::from_path("app/main.py"), Some(Language::Python));
        assert_eq!(Language::from_path("index.HTM"), Some(Language::Html));
        assert_eq!(Language::from_path("lib.mjs"), Some(Language::JavaScript));
        assert_eq!(Language::from_path("view.tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_path("README"), None);
        assert_eq!(Language::from_path("notes.md"), None);
    }

    #[test]
    fn test_fence_aliases_resolve() {
        assert_eq!(Language::from_fence_tag("py"), Some(Language::Python));
        assert_eq!(Language::from_fence_tag("Python"), Some(Language::Python));
        assert_eq!(Language::from_fence_tag("js"), Some(Language::JavaScript));
        assert_eq!(Language::from_fence_tag("rust"), None);
    }
}
