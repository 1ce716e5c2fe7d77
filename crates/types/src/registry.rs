//! Per-scope symbol table injected into a validation run.

use crate::{SymbolDefinition, SymbolKind};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Immutable table of every symbol harvested from one configuration artifact.
///
/// Built once per artifact through [`SymbolRegistry::from_definitions`] and
/// never modified afterwards. Documents without a governing artifact use
/// [`SymbolRegistry::empty`].
///
/// Names are stored and looked up in their kind's canonical form (see
/// [`SymbolKind::canonical_name`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolRegistry {
    origin: Option<Arc<Path>>,
    symbols: HashMap<SymbolKind, HashMap<String, SymbolDefinition>>,
}

impl SymbolRegistry {
    /// A registry with no symbols and no origin.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry from harvested definitions.
    ///
    /// A name declared twice within a kind is kept once; a substitution stays
    /// linkable if any of its declarations was linkable.
    #[must_use]
    pub fn from_definitions(
        origin: Option<Arc<Path>>,
        definitions: impl IntoIterator<Item = SymbolDefinition>,
    ) -> Self {
        let mut symbols: HashMap<SymbolKind, HashMap<String, SymbolDefinition>> = HashMap::new();
        for mut definition in definitions {
            if let Cow::Owned(name) = definition.kind.canonical_name(&definition.name) {
                definition.name = name;
            }
            let by_name = symbols.entry(definition.kind).or_default();
            match by_name.get_mut(&definition.name) {
                Some(existing) => existing.is_linkable |= definition.is_linkable,
                None => {
                    by_name.insert(definition.name.clone(), definition);
                }
            }
        }
        Self { origin, symbols }
    }

    /// The artifact this registry was harvested from.
    #[must_use]
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    #[must_use]
    pub fn get(&self, kind: SymbolKind, name: &str) -> Option<&SymbolDefinition> {
        self.symbols.get(&kind)?.get(&*kind.canonical_name(name))
    }

    #[must_use]
    pub fn contains(&self, kind: SymbolKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }

    /// True iff `|name|_` is resolved by this registry: a substitution named
    /// exactly `name` exists and either carries its own link or a target
    /// whose normalized name matches exists alongside it.
    #[must_use]
    pub fn is_reference_fully_defined(&self, name: &str) -> bool {
        self.get(SymbolKind::Substitution, name)
            .is_some_and(|sub| sub.is_linkable || self.contains(SymbolKind::Target, name))
    }

    /// Sorted names of every symbol of `kind`.
    #[must_use]
    pub fn names(&self, kind: SymbolKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .symbols
            .get(&kind)
            .into_iter()
            .flat_map(HashMap::keys)
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// All definitions, sorted by kind then name.
    #[must_use]
    pub fn definitions(&self) -> Vec<&SymbolDefinition> {
        let mut defs: Vec<&SymbolDefinition> =
            self.symbols.values().flat_map(HashMap::values).collect();
        defs.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        defs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(defs: Vec<SymbolDefinition>) -> SymbolRegistry {
        SymbolRegistry::from_definitions(None, defs)
    }

    #[test]
    fn test_empty_registry_defines_nothing() {
        let reg = SymbolRegistry::empty();
        assert!(reg.is_empty());
        assert!(!reg.is_reference_fully_defined("build"));
        assert_eq!(reg.origin(), None);
    }

    #[test]
    fn test_plain_substitution_is_not_fully_defined() {
        let reg = registry(vec![SymbolDefinition::substitution("build")]);
        assert!(reg.contains(SymbolKind::Substitution, "build"));
        assert!(!reg.is_reference_fully_defined("build"));
    }

    #[test]
    fn test_linkable_substitution_is_fully_defined() {
        let reg = registry(vec![SymbolDefinition::linkable_substitution("build")]);
        assert!(reg.is_reference_fully_defined("build"));
    }

    #[test]
    fn test_substitution_with_matching_target_is_fully_defined() {
        let reg = registry(vec![
            SymbolDefinition::substitution("build"),
            SymbolDefinition::target("build"),
        ]);
        assert!(reg.is_reference_fully_defined("build"));
    }

    #[test]
    fn test_target_alone_is_not_fully_defined() {
        let reg = registry(vec![SymbolDefinition::target("build")]);
        assert!(!reg.is_reference_fully_defined("build"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let reg = registry(vec![SymbolDefinition::linkable_substitution("Build")]);
        assert!(reg.is_reference_fully_defined("Build"));
        assert!(!reg.is_reference_fully_defined("build"));
    }

    #[test]
    fn test_target_lookup_is_normalized() {
        let reg = registry(vec![SymbolDefinition::new(SymbolKind::Target, "Release  Notes")]);
        assert!(reg.contains(SymbolKind::Target, "release notes"));
        assert!(reg.contains(SymbolKind::Target, "Release Notes"));
        assert_eq!(reg.names(SymbolKind::Target), vec!["release notes"]);
    }

    #[test]
    fn test_substitution_lookup_collapses_whitespace_only() {
        let mut spaced = SymbolDefinition::linkable_substitution("x");
        spaced.name = "Release  Notes".to_string();
        let reg = registry(vec![spaced]);
        assert!(reg.is_reference_fully_defined("Release Notes"));
        assert!(reg.is_reference_fully_defined("Release   Notes"));
        assert!(!reg.is_reference_fully_defined("release notes"));
    }

    #[test]
    fn test_capitalized_substitution_with_target_is_fully_defined() {
        let reg = registry(vec![
            SymbolDefinition::substitution("Build"),
            SymbolDefinition::target("Build"),
        ]);
        assert!(reg.is_reference_fully_defined("Build"));
        assert!(!reg.is_reference_fully_defined("build"));
    }

    #[test]
    fn test_duplicate_declarations_merge_linkability() {
        let reg = registry(vec![
            SymbolDefinition::substitution("build"),
            SymbolDefinition::linkable_substitution("build"),
            SymbolDefinition::substitution("build"),
        ]);
        assert_eq!(reg.len(), 1);
        assert!(reg.is_reference_fully_defined("build"));
    }

    #[test]
    fn test_kinds_are_separate_namespaces() {
        let reg = registry(vec![
            SymbolDefinition::role("issue"),
            SymbolDefinition::target("issue"),
        ]);
        assert_eq!(reg.len(), 2);
        assert!(!reg.contains(SymbolKind::Substitution, "issue"));
        assert_eq!(reg.names(SymbolKind::Role), vec!["issue"]);
    }

    #[test]
    fn test_definitions_are_sorted() {
        let reg = registry(vec![
            SymbolDefinition::target("zeta"),
            SymbolDefinition::role("beta"),
            SymbolDefinition::target("alpha"),
        ]);
        let listed: Vec<(SymbolKind, &str)> = reg
            .definitions()
            .iter()
            .map(|d| (d.kind, d.name.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![
                (SymbolKind::Role, "beta"),
                (SymbolKind::Target, "alpha"),
                (SymbolKind::Target, "zeta"),
            ]
        );
    }
}
