//! JavaScript-family scripts, analysed by pattern rather than a full parser.

use std::sync::OnceLock;

use regex::Regex;
use response_extract::syntax::{bracket_balance, BracketKind, Dialect};

use super::{unfinished_markers, Diagnostic, FileAnalysis};
use crate::symbols::{ScriptFacts, SymbolEntry};

struct Patterns {
    function: Regex,
    es_import: Regex,
    require: Regex,
    es_export: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        function: Regex::new(
            r"(?:function\s*\*?\s*([A-Za-z_$][\w$]*)|(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>))",
        )
        .expect("function pattern is valid"),
        es_import: Regex::new(r#"import\s+[^;]*?\s+from\s+['"]([^'"]+)['"]"#)
            .expect("import pattern is valid"),
        require: Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).expect("require pattern is valid"),
        es_export: Regex::new(r"(?m)^\s*export\b").expect("export pattern is valid"),
    })
}

pub fn analyze(source: &str, markers: &[String]) -> FileAnalysis {
    let p = patterns();

    let balance = bracket_balance(source, Dialect::CLike);
    let diagnostics: Vec<Diagnostic> = [BracketKind::Brace, BracketKind::Paren]
        .into_iter()
        .filter_map(|kind| balance.imbalance(kind))
        .map(Diagnostic::error)
        .collect();

    let mut exports: Vec<String> = Vec::new();
    for caps in p.function.captures_iter(source) {
        let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string());
        if let Some(name) = name {
            if !exports.contains(&name) {
                exports.push(name);
            }
        }
    }

    let imports = p
        .es_import
        .captures_iter(source)
        .chain(p.require.captures_iter(source))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();

    let facts = ScriptFacts {
        imports,
        exports,
        has_es6_exports: p.es_export.is_match(source),
    };

    FileAnalysis {
        entry: Some(SymbolEntry::Script(facts)),
        diagnostics,
    }
    .with(unfinished_markers(source, markers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(source: &str) -> ScriptFacts {
        match analyze(source, &[]).entry {
            Some(SymbolEntry::Script(facts)) => facts,
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn test_three_definition_shapes() {
        let f = facts(
            "function add(a, b) { return a + b; }\n\
             const sub = function(a, b) { return a - b; };\n\
             let mul = (a, b) => a * b;\n\
             var neg = async x => -x;\n\
             const LIMIT = 10;",
        );
        assert_eq!(f.exports, vec!["add", "sub", "mul", "neg"]);
        assert!(!f.has_es6_exports);
    }

    #[test]
    fn test_imports_and_export_flag() {
        let f = facts(
            "import { a } from './a.js';\nconst fs = require('fs');\nexport function go() {}\n",
        );
        assert_eq!(f.imports, vec!["./a.js", "fs"]);
        assert!(f.has_es6_exports);

        let f = facts("class App {}\nexport default App;\n");
        assert!(f.has_es6_exports);

        let f = facts("// Global functions instead of ES6 exports\nwindow.App = {};\n");
        assert!(!f.has_es6_exports);
    }

    #[test]
    fn test_unbalanced_reports_direction() {
        let analysis = analyze("function f() {\n  if (x) {\n    go();\n}\n", &[]);
        assert!(analysis.entry.is_some());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(
            analysis.diagnostics[0].message,
            "Unbalanced braces: 1 extra opening braces"
        );
    }

    #[test]
    fn test_braces_in_strings_are_ignored() {
        let analysis = analyze("const s = '}'; const t = `(${s}`;\n", &[]);
        assert!(analysis.diagnostics.is_empty());
    }
}
