//! Layer 3: cross-file checks over the symbol table only.

use std::collections::BTreeSet;

use crate::config::VerifierConfig;
use crate::guidance::{FORM_WITHOUT_HANDLER, MODULE_MISMATCH, UNUSED_CLASSES};
use crate::resolve::{Resolution, Resolver};
use crate::symbols::{MarkupFacts, StyleFacts, SymbolTable};
use crate::types::{Layer, VerificationIssue};

/// Class names sampled into a style-integration message.
pub const UNUSED_CLASS_SAMPLE: usize = 5;

/// Files known to the current verification call.
#[derive(Debug, Default)]
pub struct FileSet {
    /// Every declared path, normalized.
    pub declared: BTreeSet<String>,
    /// Declared paths that exist on disk.
    pub present: BTreeSet<String>,
}

pub fn check(table: &SymbolTable, files: &FileSet, config: &VerifierConfig) -> Vec<VerificationIssue> {
    let resolver = Resolver::new(&files.declared, &config.source_root);
    let mut issues = Vec::new();

    for (path, markup) in table.markup_files() {
        check_markup(path, markup, table, &resolver, config, &mut issues);
    }
    for (path, facts) in table.python_files() {
        for import in &facts.imports {
            if let Some(issue) = check_python_import(path, import, files, config) {
                issues.push(issue);
            }
        }
    }
    issues
}

fn check_markup(
    path: &str,
    markup: &MarkupFacts,
    table: &SymbolTable,
    resolver: &Resolver<'_>,
    config: &VerifierConfig,
    issues: &mut Vec<VerificationIssue>,
) {
    let fixable = |line: usize, message: String| {
        VerificationIssue::error(Layer::Semantic, path, message)
            .at_line(Some(line))
            .fixable()
    };

    let mut script_targets: Vec<String> = Vec::new();
    for (tag, src) in markup.script_refs() {
        match resolver.resolve(path, src) {
            Resolution::External => {}
            Resolution::Unresolved => {
                issues.push(fixable(tag.line, format!("Referenced script not found: {src}")));
            }
            Resolution::Local(target) => {
                let uses_exports = table.script(&target).is_some_and(|s| s.has_es6_exports);
                if uses_exports && !tag.is_module {
                    issues.push(fixable(
                        tag.line,
                        format!(
                            "Script '{src}' {MODULE_MISMATCH}; add type=\"module\" to the \
                             script tag or drop the exports and expose functions as globals"
                        ),
                    ));
                }
                script_targets.push(target);
            }
        }
    }

    for link in &markup.stylesheets {
        match resolver.resolve(path, &link.href) {
            Resolution::External => {}
            Resolution::Unresolved => {
                issues.push(fixable(
                    link.line,
                    format!("Referenced stylesheet not found: {}", link.href),
                ));
            }
            Resolution::Local(target) => {
                if let Some(style) = table.style(&target) {
                    if let Some(message) = style_integration(&link.href, style, markup, config) {
                        issues.push(fixable(link.line, message));
                    }
                }
            }
        }
    }

    for form in &markup.forms {
        if form.has_submit_control && !form.has_inline_submit_handler {
            issues.push(fixable(
                form.line,
                format!(
                    "Form {} {FORM_WITHOUT_HANDLER}; add \
                     onsubmit=\"return handleSubmit(event)\" to the form",
                    form.label()
                ),
            ));
        }
    }

    // Only exports of directly referenced scripts count; inline scripts are not inspected.
    if markup.script_refs().next().is_none() {
        return;
    }
    for call in &markup.handlers {
        let defined = script_targets
            .iter()
            .filter_map(|target| table.script(target))
            .any(|script| script.exports.iter().any(|name| name == &call.name));
        if !defined {
            issues.push(fixable(
                call.line,
                format!(
                    "Event handler calls '{}()' but no referenced script defines it",
                    call.name
                ),
            ));
        }
    }
}

fn style_integration(
    href: &str,
    style: &StyleFacts,
    markup: &MarkupFacts,
    config: &VerifierConfig,
) -> Option<String> {
    let declared = style.classes.len();
    if declared == 0 {
        return None;
    }
    let unused: Vec<&str> = style
        .classes
        .iter()
        .filter(|class| !markup.used_tokens.contains(*class))
        .map(String::as_str)
        .collect();

    let none_used = unused.len() == declared && declared > config.zero_use_class_limit;
    let mostly_unused = unused.len() as f64 / declared as f64 > config.max_unused_class_ratio;
    if !none_used && !mostly_unused {
        return None;
    }

    let sample = unused
        .iter()
        .take(UNUSED_CLASS_SAMPLE)
        .map(|c| format!(".{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "{UNUSED_CLASSES}'{href}' are not used in the markup ({} of {declared} unused: {sample}); \
         add matching class attributes to elements",
        unused.len()
    ))
}

fn check_python_import(
    path: &str,
    import: &str,
    files: &FileSet,
    config: &VerifierConfig,
) -> Option<VerificationIssue> {
    if import.starts_with('.') || import.contains('.') || config.is_stdlib(import) {
        return None;
    }
    let candidates = [
        format!("{import}.py"),
        format!("{}/{import}.py", config.source_root),
        format!("{import}/__init__.py"),
    ];
    if candidates.iter().any(|c| files.present.contains(c)) {
        return None;
    }
    Some(VerificationIssue::warning(
        Layer::Semantic,
        path,
        format!("Import '{import}' not found in project (may be external dependency)"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{CodeFacts, FormFacts, ScriptFacts, ScriptTag, StylesheetLink, SymbolEntry};

    fn files(paths: &[&str]) -> FileSet {
        let set: BTreeSet<String> = paths.iter().map(|p| (*p).to_string()).collect();
        FileSet {
            declared: set.clone(),
            present: set,
        }
    }

    fn style(classes: &[&str]) -> SymbolEntry {
        SymbolEntry::Style(StyleFacts {
            selectors: classes.iter().map(|c| format!(".{c}")).collect(),
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
        })
    }

    fn page(used: &[&str]) -> MarkupFacts {
        MarkupFacts {
            stylesheets: vec![StylesheetLink {
                href: "styles.css".into(),
                line: 3,
            }],
            used_tokens: used.iter().map(|c| (*c).to_string()).collect(),
            has_doctype: true,
            ..MarkupFacts::default()
        }
    }

    fn run(markup: MarkupFacts, css: SymbolEntry) -> Vec<VerificationIssue> {
        let mut table = SymbolTable::default();
        table.insert("index.html", SymbolEntry::Markup(markup));
        table.insert("styles.css", css);
        check(&table, &files(&["index.html", "styles.css"]), &VerifierConfig::default())
    }

    #[test]
    fn test_style_thresholds() {
        let four = ["a", "b", "c", "d"];
        assert_eq!(run(page(&[]), style(&four)).len(), 1);
        assert!(run(page(&four), style(&four)).is_empty());
        assert!(run(page(&["a", "b", "c"]), style(&four)).is_empty());
        assert!(run(page(&["a", "b"]), style(&four)).is_empty());
        assert_eq!(run(page(&["a"]), style(&four)).len(), 1);
    }

    #[test]
    fn test_single_unused_class_fails_by_ratio() {
        let issues = run(page(&[]), style(&["container"]));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("CSS"));
        assert!(issues[0].message.contains(".container"));
        assert!(issues[0].auto_fixable);
    }

    #[test]
    fn test_module_marker_and_handlers() {
        let mut markup = page(&[]);
        markup.stylesheets.clear();
        markup.script_tags.push(ScriptTag {
            src: Some("app.js".into()),
            is_module: false,
            line: 4,
        });
        markup.handlers.push(crate::symbols::HandlerCall {
            name: "missing".into(),
            attribute: "onclick".into(),
            line: 9,
        });
        markup.forms.push(FormFacts {
            id: Some("signup".into()),
            has_inline_submit_handler: false,
            has_submit_control: true,
            line: 7,
        });

        let mut table = SymbolTable::default();
        table.insert("index.html", SymbolEntry::Markup(markup));
        table.insert(
            "app.js",
            SymbolEntry::Script(ScriptFacts {
                exports: vec!["init".into()],
                has_es6_exports: true,
                ..ScriptFacts::default()
            }),
        );
        let issues = check(&table, &files(&["index.html", "app.js"]), &VerifierConfig::default());
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(issues.len(), 3, "{messages:?}");
        assert!(messages[0].contains("type=\"module\""));
        assert!(messages[1].contains("Form 'signup'"));
        assert!(messages[2].contains("'missing()'"));
        assert_eq!(issues[2].line, Some(9));
    }

    #[test]
    fn test_python_import_locality() {
        let mut table = SymbolTable::default();
        table.insert(
            "main.py",
            SymbolEntry::Python(CodeFacts {
                imports: vec!["os".into(), "helpers".into(), "requests".into(), "os.path".into(), ".rel".into()],
                exports: vec![],
            }),
        );
        let issues = check(
            &table,
            &files(&["main.py", "src/helpers.py"]),
            &VerifierConfig::default(),
        );
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("'requests'"));
        assert_eq!(issues[0].severity, crate::types::Severity::Warning);
    }
}
