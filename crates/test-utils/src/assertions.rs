//! Snapshot testing assertions for rst-check diagnostics
//!
//! Diagnostics are formatted relative to a project root so snapshots do not
//! depend on where the temporary directory lives.

use rst_types::Diagnostic;
use std::path::Path;

/// Format a list of diagnostics for snapshot testing.
///
/// # Example
///
/// ```ignore
/// use rst_test_utils::assertions::format_diagnostics;
///
/// let report = checker.check(&fixture.path("index.rst"))?;
/// insta::assert_snapshot!(format_diagnostics(&report.diagnostics, fixture.root()));
/// ```
#[must_use]
pub fn format_diagnostics(diagnostics: &[Diagnostic], root: &Path) -> String {
    if diagnostics.is_empty() {
        return String::from("(no diagnostics)");
    }

    diagnostics
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let path = d.file_path.strip_prefix(root).unwrap_or(&d.file_path);
            let subject = d.name().map(|n| format!(" [{} {n}]", d.category)).unwrap_or_default();
            format!("[{}] {}:{}: ({}){subject} {}", i + 1, path.display(), d.line, d.severity, d.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_diagnostics_empty() {
        assert_eq!(format_diagnostics(&[], Path::new("/")), "(no diagnostics)");
    }

    #[test]
    fn test_format_diagnostics_relative() {
        let diagnostics = vec![Diagnostic::unknown_role(Path::new("/project/docs/index.rst"), 3, "issue")];
        let formatted = format_diagnostics(&diagnostics, Path::new("/project"));
        assert!(formatted.starts_with("[1] docs/index.rst:3: (error) [unknown-role issue]"));
    }
}
