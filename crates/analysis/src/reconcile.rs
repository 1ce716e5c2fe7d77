//! Post-processing of raw validator output against a scope's registry.
//!
//! The validator reports a combined reference `|name|_` as two unrelated
//! errors on the same line: an undefined substitution and an unknown target.
//! The substitution half keeps the name's case while the target half is
//! lowercased (`|Build|_` yields `"Build"` and `"build"`), so
//! reference diagnostics are grouped by line and normalized name. Each group
//! is decided as a unit: the pair is suppressed together or reported together.

use rst_types::{normalize_name, Diagnostic, DiagnosticCategory, SymbolKind, SymbolRegistry};
use std::borrow::Cow;
use std::collections::HashMap;

/// Outcome of reconciling one document's diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Diagnostics that survive, in their original order
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics proven to be false positives
    pub suppressed: Vec<Diagnostic>,
    /// Number of groups that matched no known shape and were passed through
    pub ambiguous_groups: usize,
}

/// How a `(line, name)` group of reference diagnostics is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupShape {
    /// Equal numbers of undefined-substitution and unknown-target entries
    Paired,
    /// Only undefined-substitution entries
    SubstitutionOnly,
    /// Only unknown-target entries
    TargetOnly,
    /// Both categories in unequal numbers
    Ambiguous,
}

/// Substitution and target diagnostics sharing a line and normalized name.
#[derive(Debug, Default)]
struct ReferenceGroup<'a> {
    substitutions: usize,
    targets: usize,
    /// Substitution names exactly as reported
    substitution_names: Vec<&'a str>,
    /// Verdict for a paired group
    fully_defined: bool,
}

impl ReferenceGroup<'_> {
    const fn shape(&self) -> GroupShape {
        match (self.substitutions, self.targets) {
            (_, 0) => GroupShape::SubstitutionOnly,
            (0, _) => GroupShape::TargetOnly,
            (n, m) if n == m => GroupShape::Paired,
            _ => GroupShape::Ambiguous,
        }
    }
}

type GroupKey<'a> = (usize, Cow<'a, str>);

/// Grouping key for reference diagnostics; `None` for every other kind.
fn group_key(diagnostic: &Diagnostic) -> Option<GroupKey<'_>> {
    match diagnostic.category {
        DiagnosticCategory::UndefinedSubstitution | DiagnosticCategory::UnknownTarget => diagnostic
            .name()
            .map(|name| (diagnostic.line, normalize_name(name))),
        _ => None,
    }
}

/// Remove the diagnostics `registry` proves are false positives.
///
/// Every decision is a registry lookup; no name is treated specially. Entries
/// without a subject name are never suppressed.
#[must_use]
#[tracing::instrument(skip_all, fields(raw = raw.len(), symbols = registry.len()))]
pub fn reconcile(raw: Vec<Diagnostic>, registry: &SymbolRegistry) -> Reconciliation {
    let (suppress, ambiguous_groups) = suppression_flags(&raw, registry);

    let mut reconciliation = Reconciliation {
        ambiguous_groups,
        ..Reconciliation::default()
    };
    for (diagnostic, suppressed) in raw.into_iter().zip(suppress) {
        if suppressed {
            reconciliation.suppressed.push(diagnostic);
        } else {
            reconciliation.diagnostics.push(diagnostic);
        }
    }

    tracing::debug!(
        kept = reconciliation.diagnostics.len(),
        suppressed = reconciliation.suppressed.len(),
        "Reconciled diagnostics"
    );
    reconciliation
}

/// One flag per input diagnostic, plus the number of ambiguous groups.
fn suppression_flags(raw: &[Diagnostic], registry: &SymbolRegistry) -> (Vec<bool>, usize) {
    let keys: Vec<Option<GroupKey<'_>>> = raw.iter().map(group_key).collect();

    let mut groups: HashMap<&GroupKey<'_>, ReferenceGroup<'_>> = HashMap::new();
    for (diagnostic, key) in raw.iter().zip(&keys) {
        let (Some(key), Some(name)) = (key, diagnostic.name()) else {
            continue;
        };
        let group = groups.entry(key).or_default();
        if diagnostic.category == DiagnosticCategory::UndefinedSubstitution {
            group.substitutions += 1;
            if !group.substitution_names.contains(&name) {
                group.substitution_names.push(name);
            }
        } else {
            group.targets += 1;
        }
    }

    let mut ambiguous_groups = 0;
    for ((line, name), group) in &mut groups {
        match group.shape() {
            GroupShape::Paired => {
                group.fully_defined = group
                    .substitution_names
                    .iter()
                    .all(|exact| registry.is_reference_fully_defined(exact));
                tracing::trace!(line, %name, defined = group.fully_defined, "Combined reference");
            }
            GroupShape::Ambiguous => {
                tracing::debug!(
                    line,
                    %name,
                    substitutions = group.substitutions,
                    targets = group.targets,
                    "Ambiguous diagnostic group, passing through"
                );
                ambiguous_groups += 1;
            }
            GroupShape::SubstitutionOnly | GroupShape::TargetOnly => {}
        }
    }

    let suppress: Vec<bool> = raw
        .iter()
        .zip(&keys)
        .map(|(diagnostic, key)| {
            let Some(name) = diagnostic.name() else {
                return false;
            };
            match diagnostic.category {
                DiagnosticCategory::UndefinedSubstitution | DiagnosticCategory::UnknownTarget => {
                    let Some(group) = key.as_ref().and_then(|key| groups.get(key)) else {
                        return false;
                    };
                    match group.shape() {
                        GroupShape::Paired => group.fully_defined,
                        GroupShape::SubstitutionOnly => {
                            registry.contains(SymbolKind::Substitution, name)
                        }
                        GroupShape::TargetOnly => registry.contains(SymbolKind::Target, name),
                        GroupShape::Ambiguous => false,
                    }
                }
                DiagnosticCategory::UnknownRole => registry.contains(SymbolKind::Role, name),
                DiagnosticCategory::UnknownDirective => {
                    registry.contains(SymbolKind::Directive, name)
                }
                DiagnosticCategory::Other => false,
            }
        })
        .collect();

    (suppress, ambiguous_groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rst_types::{normalize_whitespace, DiagnosticSeverity, SymbolDefinition};
    use std::path::Path;

    const DOC: &str = "/project/docs/index.rst";

    /// What docutils reports for `|name|_`: whitespace is collapsed in both
    /// halves and the target half is also lowercased.
    fn combined(line: usize, name: &str) -> Vec<Diagnostic> {
        vec![
            Diagnostic::undefined_substitution(Path::new(DOC), line, &normalize_whitespace(name)),
            Diagnostic::unknown_target(Path::new(DOC), line, &normalize_name(name)),
        ]
    }

    fn registry(definitions: Vec<SymbolDefinition>) -> SymbolRegistry {
        SymbolRegistry::from_definitions(None, definitions)
    }

    fn names(diagnostics: &[Diagnostic]) -> Vec<(usize, DiagnosticCategory, &str)> {
        diagnostics
            .iter()
            .map(|d| (d.line, d.category, d.name().unwrap_or("")))
            .collect()
    }

    #[test]
    fn test_empty_registry_keeps_everything() {
        let raw = combined(3, "build");
        let result = reconcile(raw.clone(), &SymbolRegistry::empty());
        assert_eq!(result.diagnostics, raw);
        assert!(result.suppressed.is_empty());
    }

    #[test]
    fn test_linkable_substitution_suppresses_pair() {
        let result = reconcile(
            combined(3, "build"),
            &registry(vec![SymbolDefinition::linkable_substitution("build")]),
        );
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.suppressed.len(), 2);
    }

    #[test]
    fn test_mirrored_target_suppresses_pair() {
        let result = reconcile(
            combined(3, "build"),
            &registry(vec![
                SymbolDefinition::substitution("build"),
                SymbolDefinition::target("build"),
            ]),
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_non_linkable_substitution_keeps_both() {
        let result = reconcile(
            combined(3, "build"),
            &registry(vec![SymbolDefinition::substitution("build")]),
        );
        assert_eq!(
            names(&result.diagnostics),
            vec![
                (3, DiagnosticCategory::UndefinedSubstitution, "build"),
                (3, DiagnosticCategory::UnknownTarget, "build"),
            ]
        );
    }

    #[test]
    fn test_target_alone_does_not_resolve_pair() {
        let result = reconcile(
            combined(3, "build"),
            &registry(vec![SymbolDefinition::target("build")]),
        );
        assert_eq!(result.diagnostics.len(), 2);
    }

    #[test]
    fn test_single_substitution_uses_existence() {
        let raw = vec![Diagnostic::undefined_substitution(Path::new(DOC), 5, "version")];
        let defined = registry(vec![SymbolDefinition::substitution("version")]);
        assert!(reconcile(raw.clone(), &defined).diagnostics.is_empty());
        assert_eq!(reconcile(raw, &SymbolRegistry::empty()).diagnostics.len(), 1);
    }

    #[test]
    fn test_single_target_uses_existence() {
        let raw = vec![Diagnostic::unknown_target(Path::new(DOC), 5, "changelog")];
        let defined = registry(vec![SymbolDefinition::target("changelog")]);
        assert!(reconcile(raw.clone(), &defined).diagnostics.is_empty());

        let only_substitution = registry(vec![SymbolDefinition::linkable_substitution("changelog")]);
        assert_eq!(reconcile(raw, &only_substitution).diagnostics.len(), 1);
    }

    #[test]
    fn test_roles_and_directives_use_existence() {
        let raw = vec![
            Diagnostic::unknown_role(Path::new(DOC), 1, "issue"),
            Diagnostic::unknown_role(Path::new(DOC), 2, "pr"),
            Diagnostic::unknown_directive(Path::new(DOC), 4, "todo-list"),
        ];
        let result = reconcile(
            raw,
            &registry(vec![
                SymbolDefinition::role("issue"),
                SymbolDefinition::directive("todo-list"),
            ]),
        );
        assert_eq!(
            names(&result.diagnostics),
            vec![(2, DiagnosticCategory::UnknownRole, "pr")]
        );
    }

    #[test]
    fn test_role_named_like_substitution_is_not_suppressed() {
        let raw = vec![Diagnostic::unknown_role(Path::new(DOC), 1, "build")];
        let result = reconcile(
            raw,
            &registry(vec![SymbolDefinition::linkable_substitution("build")]),
        );
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_groups_are_per_line() {
        let mut raw = combined(3, "build");
        raw.push(Diagnostic::undefined_substitution(Path::new(DOC), 8, "build"));
        let result = reconcile(
            raw,
            &registry(vec![SymbolDefinition::substitution("build")]),
        );
        // Line 3 is a combined reference with no link; line 8 is a plain
        // substitution reference that exists.
        assert_eq!(
            names(&result.diagnostics),
            vec![
                (3, DiagnosticCategory::UndefinedSubstitution, "build"),
                (3, DiagnosticCategory::UnknownTarget, "build"),
            ]
        );
        assert_eq!(names(&result.suppressed), vec![(8, DiagnosticCategory::UndefinedSubstitution, "build")]);
    }

    #[test]
    fn test_unequal_counts_pass_through() {
        let mut raw = combined(3, "build");
        raw.push(Diagnostic::undefined_substitution(Path::new(DOC), 3, "build"));
        let result = reconcile(
            raw.clone(),
            &registry(vec![SymbolDefinition::linkable_substitution("build")]),
        );
        assert_eq!(result.diagnostics, raw);
        assert_eq!(result.ambiguous_groups, 1);
    }

    #[test]
    fn test_unnamed_and_other_diagnostics_pass_through() {
        let raw = vec![
            Diagnostic::new(DOC, 0, DiagnosticSeverity::Warning, "Document may not end with a transition."),
            Diagnostic::new(DOC, 2, DiagnosticSeverity::Warning, "Title underline too short."),
        ];
        let full = registry(vec![SymbolDefinition::linkable_substitution("build")]);
        assert_eq!(reconcile(raw.clone(), &full).diagnostics, raw);
    }

    #[test]
    fn test_order_is_preserved() {
        let raw = vec![
            Diagnostic::unknown_role(Path::new(DOC), 9, "zeta"),
            Diagnostic::undefined_substitution(Path::new(DOC), 1, "bogus"),
            Diagnostic::unknown_target(Path::new(DOC), 1, "bogus"),
            Diagnostic::unknown_role(Path::new(DOC), 2, "issue"),
            Diagnostic::unknown_role(Path::new(DOC), 4, "alpha"),
        ];
        let result = reconcile(raw, &registry(vec![SymbolDefinition::role("issue")]));
        assert_eq!(
            names(&result.diagnostics),
            vec![
                (9, DiagnosticCategory::UnknownRole, "zeta"),
                (1, DiagnosticCategory::UndefinedSubstitution, "bogus"),
                (1, DiagnosticCategory::UnknownTarget, "bogus"),
                (4, DiagnosticCategory::UnknownRole, "alpha"),
            ]
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let result = reconcile(
            combined(1, "Build"),
            &registry(vec![SymbolDefinition::linkable_substitution("build")]),
        );
        assert_eq!(result.diagnostics.len(), 2);
    }

    #[test]
    fn test_capitalized_combined_reference_pairs_across_normalization() {
        let raw = combined(2, "Build");
        assert_eq!(
            names(&raw),
            vec![
                (2, DiagnosticCategory::UndefinedSubstitution, "Build"),
                (2, DiagnosticCategory::UnknownTarget, "build"),
            ]
        );

        let plain = registry(vec![SymbolDefinition::substitution("Build")]);
        assert_eq!(reconcile(raw.clone(), &plain).diagnostics, raw);

        let linkable = registry(vec![SymbolDefinition::linkable_substitution("Build")]);
        assert!(reconcile(raw.clone(), &linkable).diagnostics.is_empty());

        let mirrored = registry(vec![
            SymbolDefinition::substitution("Build"),
            SymbolDefinition::target("Build"),
        ]);
        let result = reconcile(raw, &mirrored);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.suppressed.len(), 2);
    }

    #[test]
    fn test_spaced_combined_reference_pairs() {
        let raw = combined(4, "Release  Notes");
        assert_eq!(
            names(&raw),
            vec![
                (4, DiagnosticCategory::UndefinedSubstitution, "Release Notes"),
                (4, DiagnosticCategory::UnknownTarget, "release notes"),
            ]
        );
        let result = reconcile(
            raw,
            &registry(vec![SymbolDefinition::linkable_substitution("Release  Notes")]),
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_case_variants_on_one_line_need_every_substitution() {
        let mut raw = combined(1, "Build");
        raw.extend(combined(1, "build"));
        let only_upper = registry(vec![SymbolDefinition::linkable_substitution("Build")]);
        assert_eq!(reconcile(raw.clone(), &only_upper).diagnostics.len(), 4);

        let both = registry(vec![
            SymbolDefinition::linkable_substitution("Build"),
            SymbolDefinition::linkable_substitution("build"),
        ]);
        assert!(reconcile(raw, &both).diagnostics.is_empty());
    }

    #[test]
    fn test_plain_target_reference_matches_normalized_declaration() {
        let raw = vec![Diagnostic::unknown_target(Path::new(DOC), 6, "changelog")];
        let declared = registry(vec![SymbolDefinition::target("ChangeLog")]);
        assert!(reconcile(raw, &declared).diagnostics.is_empty());
    }
}
