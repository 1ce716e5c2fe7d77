//! The seam between the pipeline and the markup validator.

use crate::Result;
use regex::Regex;
use rst_types::{Diagnostic, DiagnosticCategory, SymbolKind, SymbolRegistry};
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

/// A registry flattened into the shape validators accept: one sorted name
/// list per symbol kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InjectedSymbols {
    pub roles: Vec<String>,
    pub directives: Vec<String>,
    pub substitutions: Vec<String>,
    pub targets: Vec<String>,
}

impl InjectedSymbols {
    /// Flatten `registry`, adding names the user marked as always known.
    #[must_use]
    pub fn from_registry(
        registry: &SymbolRegistry,
        extra_roles: &[String],
        extra_directives: &[String],
    ) -> Self {
        let collect = |kind: SymbolKind, extra: &[String]| {
            let mut names: Vec<String> = registry
                .names(kind)
                .into_iter()
                .map(ToString::to_string)
                .chain(extra.iter().cloned())
                .collect();
            names.sort_unstable();
            names.dedup();
            names
        };

        Self {
            roles: collect(SymbolKind::Role, extra_roles),
            directives: collect(SymbolKind::Directive, extra_directives),
            substitutions: collect(SymbolKind::Substitution, &[]),
            targets: collect(SymbolKind::Target, &[]),
        }
    }
}

/// A markup validator, treated as a black box.
///
/// Implementations receive the document text plus the injected symbols and
/// return positioned diagnostics in the order they were produced.
pub trait MarkupValidator: Send + Sync {
    fn validate(&self, path: &Path, text: &str, symbols: &InjectedSymbols) -> Result<Vec<Diagnostic>>;
}

struct MessagePattern {
    category: DiagnosticCategory,
    regex: Regex,
}

static MESSAGE_PATTERNS: LazyLock<Vec<MessagePattern>> = LazyLock::new(|| {
    [
        (
            DiagnosticCategory::UndefinedSubstitution,
            r#"^Undefined substitution referenced: "(?P<name>.+)"\.$"#,
        ),
        (
            DiagnosticCategory::UnknownTarget,
            r#"^Unknown target name: "(?P<name>.+)"\.$"#,
        ),
        (
            DiagnosticCategory::UnknownRole,
            r#"^Unknown interpreted text role "(?P<name>.+)"\.$"#,
        ),
        (
            DiagnosticCategory::UnknownDirective,
            r#"^Unknown directive type "(?P<name>.+)"\.$"#,
        ),
    ]
    .into_iter()
    .filter_map(|(category, pattern)| {
        // A dropped pattern leaves its messages as `Other`, which is never suppressed
        Regex::new(pattern)
            .map_err(|e| tracing::error!(%category, error = %e, "Invalid message pattern"))
            .ok()
            .map(|regex| MessagePattern { category, regex })
    })
    .collect()
});

/// Derive a category and subject from a validator message.
///
/// Only the first line is inspected; directive messages carry the offending
/// block after it. Unrecognized wording is [`DiagnosticCategory::Other`].
#[must_use]
pub fn classify_message(message: &str) -> (DiagnosticCategory, Option<String>) {
    let first_line = message.lines().next().unwrap_or("").trim();
    MESSAGE_PATTERNS
        .iter()
        .find_map(|pattern| {
            pattern
                .regex
                .captures(first_line)
                .map(|caps| (pattern.category, Some(caps["name"].to_string())))
        })
        .unwrap_or((DiagnosticCategory::Other, None))
}
