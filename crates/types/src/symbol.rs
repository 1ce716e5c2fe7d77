//! Symbols declared by a configuration artifact.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

/// Normalize a hyperlink reference name the way docutils does: lowercase,
/// with runs of whitespace collapsed to one space and the ends trimmed.
#[must_use]
pub fn normalize_name(name: &str) -> Cow<'_, str> {
    collapse(name, true)
}

/// Collapse runs of whitespace to one space and trim the ends, keeping case.
/// docutils reports substitution names in this form.
#[must_use]
pub fn normalize_whitespace(name: &str) -> Cow<'_, str> {
    collapse(name, false)
}

fn collapse(name: &str, lowercase: bool) -> Cow<'_, str> {
    let normalized = !name
        .chars()
        .any(|c| (lowercase && c.is_uppercase()) || (c.is_whitespace() && c != ' '))
        && name.split(' ').all(|word| !word.is_empty());
    if normalized {
        return Cow::Borrowed(name);
    }
    let words = name.split_whitespace();
    let words: Vec<String> = if lowercase {
        words.map(str::to_lowercase).collect()
    } else {
        words.map(str::to_string).collect()
    };
    Cow::Owned(words.join(" "))
}

/// Namespace a symbol lives in.
///
/// Names are unique within a kind; a substitution and a target may share a name
/// and are still distinct symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    /// Interpreted text role (`:name:`)
    Role,
    /// Directive (`.. name::`)
    Directive,
    /// Substitution definition (`|name|`)
    Substitution,
    /// Hyperlink target (`name_`)
    Target,
}

impl SymbolKind {
    /// The form a name of this kind is stored and looked up in.
    ///
    /// Targets are fully normalized, substitutions only have their whitespace
    /// collapsed (they stay case-sensitive), roles and directives match as
    /// written.
    #[must_use]
    pub fn canonical_name(self, name: &str) -> Cow<'_, str> {
        match self {
            Self::Target => normalize_name(name),
            Self::Substitution => normalize_whitespace(name),
            Self::Role | Self::Directive => Cow::Borrowed(name),
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Role => write!(f, "role"),
            Self::Directive => write!(f, "directive"),
            Self::Substitution => write!(f, "substitution"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// A single harvested declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolDefinition {
    pub kind: SymbolKind,
    /// Case-sensitive name, in the kind's canonical form
    pub name: String,
    /// Artifact the declaration came from
    pub origin: Option<Arc<Path>>,
    /// A substitution that also resolves as a hyperlink target
    pub is_linkable: bool,
}

impl SymbolDefinition {
    #[must_use]
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            kind,
            name: kind.canonical_name(&name).into_owned(),
            origin: None,
            is_linkable: false,
        }
    }

    #[must_use]
    pub fn role(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::Role, name)
    }

    #[must_use]
    pub fn directive(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::Directive, name)
    }

    #[must_use]
    pub fn substitution(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::Substitution, name)
    }

    /// A substitution carrying its own link, so `|name|_` resolves without
    /// a separate target.
    #[must_use]
    pub fn linkable_substitution(name: impl Into<String>) -> Self {
        Self {
            is_linkable: true,
            ..Self::new(SymbolKind::Substitution, name)
        }
    }

    /// A hyperlink target; the name is stored normalized.
    #[must_use]
    pub fn target(name: impl Into<String>) -> Self {
        Self::new(SymbolKind::Target, name)
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Arc<Path>) -> Self {
        self.origin = Some(origin);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("build"), "build");
        assert_eq!(normalize_name("Build"), "build");
        assert_eq!(normalize_name("  Release\tNotes  \n v2 "), "release notes v2");
        assert_eq!(normalize_name("release  notes"), "release notes");
    }

    #[test]
    fn test_normalize_name_borrows_when_already_normal() {
        assert!(matches!(normalize_name("release notes"), Cow::Borrowed(_)));
        assert!(matches!(normalize_name("Release notes"), Cow::Owned(_)));
    }

    #[test]
    fn test_normalize_whitespace_keeps_case() {
        assert_eq!(normalize_whitespace("Release  Notes"), "Release Notes");
        assert_eq!(normalize_whitespace(" Release\nNotes "), "Release Notes");
        assert!(matches!(normalize_whitespace("Release Notes"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_names_are_canonical_at_declaration() {
        assert_eq!(SymbolDefinition::target("Release  Notes").name, "release notes");
        assert_eq!(SymbolDefinition::substitution("Release  Notes").name, "Release Notes");
        assert_eq!(SymbolDefinition::role("Issue").name, "Issue");
    }
}
