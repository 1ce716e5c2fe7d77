//! A fake markup validator that reports what docutils would for the
//! reference forms rst-check reconciles.

use regex::Regex;
use rst_analysis::{InjectedSymbols, MarkupValidator, Result};
use rst_config::declarations::parse_declarations;
use rst_types::{normalize_name, normalize_whitespace, Diagnostic, SymbolKind};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;

static SUBSTITUTION_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|(?P<name>[^|\s](?:[^|]*[^|\s])?)\|(?P<link>__?)?").unwrap()
});
static ROLE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w`]):(?P<name>[A-Za-z][\w.+:-]*):`").unwrap());
static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\.\.\s+(?P<name>[A-Za-z][\w.+:-]*)::").unwrap());
static EXPLICIT_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\.\.\s+[|_]").unwrap());

const BUILTIN_ROLES: &[&str] = &[
    "emphasis", "strong", "literal", "code", "math", "sub", "sup", "subscript", "superscript",
    "title-reference", "abbreviation", "pep-reference", "rfc-reference", "raw",
];

const BUILTIN_DIRECTIVES: &[&str] = &[
    "note", "warning", "tip", "important", "caution", "danger", "error", "hint", "attention",
    "admonition", "image", "figure", "code", "code-block", "sourcecode", "include", "raw",
    "contents", "topic", "sidebar", "rubric", "container", "table", "csv-table", "list-table",
    "math", "parsed-literal", "class", "role", "default-role", "title", "meta",
];

/// Fake validator.
///
/// Only roles and directives are taken from the injected symbols, as with the
/// docutils driver; substitutions and targets resolve only when the document
/// declares them itself.
#[derive(Debug, Default)]
pub struct ScriptedValidator {
    fixed: Option<Vec<Diagnostic>>,
    calls: AtomicUsize,
}

impl ScriptedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore the document and report `diagnostics` verbatim.
    pub fn fixed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            fixed: Some(diagnostics),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn scan(path: &Path, text: &str, symbols: &InjectedSymbols) -> Vec<Diagnostic> {
        let local = parse_declarations(text);
        let declared = |kind: SymbolKind| -> HashSet<&str> {
            local.iter().filter(|d| d.kind == kind).map(|d| d.name.as_str()).collect()
        };
        let substitutions = declared(SymbolKind::Substitution);
        let targets = declared(SymbolKind::Target);

        let known_role = |name: &str| BUILTIN_ROLES.contains(&name) || symbols.roles.iter().any(|r| r == name);
        let known_directive =
            |name: &str| BUILTIN_DIRECTIVES.contains(&name) || symbols.directives.iter().any(|d| d == name);

        let mut diagnostics = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;

            if let Some(caps) = DIRECTIVE.captures(line) {
                if !known_directive(&caps["name"]) {
                    diagnostics.push(Diagnostic::unknown_directive(path, line_no, &caps["name"]));
                }
                continue;
            }
            if EXPLICIT_DECLARATION.is_match(line) {
                continue;
            }

            for caps in ROLE_REF.captures_iter(line) {
                if !known_role(&caps["name"]) {
                    diagnostics.push(Diagnostic::unknown_role(path, line_no, &caps["name"]));
                }
            }

            for caps in SUBSTITUTION_REF.captures_iter(line) {
                let name = normalize_whitespace(&caps["name"]);
                if !substitutions.contains(&*name) {
                    diagnostics.push(Diagnostic::undefined_substitution(path, line_no, &name));
                }
                // docutils reports the target half under its normalized refname
                let refname = normalize_name(&name);
                if caps.name("link").is_some_and(|m| m.as_str() == "_") && !targets.contains(&*refname) {
                    diagnostics.push(Diagnostic::unknown_target(path, line_no, &refname));
                }
            }
        }
        diagnostics
    }
}

impl MarkupValidator for ScriptedValidator {
    fn validate(&self, path: &Path, text: &str, symbols: &InjectedSymbols) -> Result<Vec<Diagnostic>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.fixed {
            Some(diagnostics) => diagnostics.clone(),
            None => Self::scan(path, text, symbols),
        })
    }
}
