//! Python: tree-sitter parse, imports and top-level definitions.

use response_extract::syntax::parse_python;
use tree_sitter::Node;

use super::{unfinished_markers, Diagnostic, FileAnalysis};
use crate::symbols::{CodeFacts, SymbolEntry};

pub fn analyze(source: &str, markers: &[String]) -> FileAnalysis {
    let tree = match parse_python(source) {
        Ok(tree) => tree,
        Err(issue) => {
            return FileAnalysis::failed(
                Diagnostic::error(format!("Python syntax error: {}", issue.message)).at_line(issue.line),
            )
        }
    };

    let root = tree.root_node();
    let bytes = source.as_bytes();
    let mut facts = CodeFacts::default();
    collect_imports(root, bytes, &mut facts.imports);

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if let Some(name) = definition_name(child, bytes) {
            facts.exports.push(name);
        }
    }

    FileAnalysis::facts(SymbolEntry::Python(facts)).with(unfinished_markers(source, markers))
}

fn text(node: Node<'_>, bytes: &[u8]) -> Option<String> {
    node.utf8_text(bytes).ok().map(str::to_string)
}

fn collect_imports(node: Node<'_>, bytes: &[u8], out: &mut Vec<String>) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                let name = match child.kind() {
                    "dotted_name" => text(child, bytes),
                    "aliased_import" => child
                        .child_by_field_name("name")
                        .and_then(|n| text(n, bytes)),
                    _ => None,
                };
                out.extend(name);
            }
            return;
        }
        "import_from_statement" => {
            if let Some(module) = node
                .child_by_field_name("module_name")
                .and_then(|n| text(n, bytes))
            {
                out.push(module);
            }
            return;
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_imports(child, bytes, out);
    }
}

fn definition_name(node: Node<'_>, bytes: &[u8]) -> Option<String> {
    match node.kind() {
        "function_definition" | "class_definition" => node
            .child_by_field_name("name")
            .and_then(|n| text(n, bytes)),
        "decorated_definition" => node
            .child_by_field_name("definition")
            .and_then(|def| definition_name(def, bytes)),
        _ => None,
    }
}
