//! Strict object-notation data files.

use response_extract::syntax::check_json;

use super::{Diagnostic, FileAnalysis};
use crate::symbols::SymbolEntry;

pub fn analyze(source: &str) -> FileAnalysis {
    match check_json(source) {
        Ok(()) => FileAnalysis::facts(SymbolEntry::Data),
        Err(issue) => FileAnalysis::failed(Diagnostic::error(issue.message).at_line(issue.line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_comma_reports_line() {
        let analysis = analyze("{\n  \"name\": \"demo\",\n  \"version\": 1,\n}\n");
        assert!(analysis.entry.is_none());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].line, Some(4));
        assert!(analysis.diagnostics[0].message.starts_with("Invalid JSON"));
    }

    #[test]
    fn test_valid_json() {
        assert_eq!(analyze("[1, 2, 3]").entry, Some(SymbolEntry::Data));
    }
}
