//! Positioned diagnostics produced by the markup validator.

use crate::DiagnosticSeverity;
use std::path::{Path, PathBuf};

/// What a diagnostic is about.
///
/// Only the categories that can be resolved by project-wide declarations are
/// distinguished; everything else is [`DiagnosticCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// `|name|` used without a substitution definition
    UndefinedSubstitution,
    /// `name_` used without a hyperlink target
    UnknownTarget,
    /// `:name:` interpreted text with an unregistered role
    UnknownRole,
    /// `.. name::` with an unregistered directive
    UnknownDirective,
    /// Anything else the validator reports
    Other,
}

impl std::fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedSubstitution => write!(f, "undefined-substitution"),
            Self::UnknownTarget => write!(f, "unknown-target"),
            Self::UnknownRole => write!(f, "unknown-role"),
            Self::UnknownDirective => write!(f, "unknown-directive"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A diagnostic reported for one document.
///
/// Diagnostics are never mutated after the validator produced them; later
/// stages only drop entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Document the diagnostic belongs to
    pub file_path: PathBuf,
    /// 1-based line number, 0 when the validator gave no location
    pub line: usize,
    pub severity: DiagnosticSeverity,
    pub category: DiagnosticCategory,
    /// Subject extracted from the message (absent for `Other`)
    pub name: Option<String>,
    /// Message text as the validator worded it
    pub message: String,
}

impl Diagnostic {
    /// Create an uncategorized diagnostic.
    #[must_use]
    pub fn new(
        file_path: impl Into<PathBuf>,
        line: usize,
        severity: DiagnosticSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            severity,
            category: DiagnosticCategory::Other,
            name: None,
            message: message.into(),
        }
    }

    /// Attach a category and subject name.
    #[must_use]
    pub fn with_subject(mut self, category: DiagnosticCategory, name: impl Into<String>) -> Self {
        self.category = category;
        self.name = Some(name.into());
        self
    }

    /// `Undefined substitution referenced: "name".` at error level.
    #[must_use]
    pub fn undefined_substitution(file_path: &Path, line: usize, name: &str) -> Self {
        Self::new(
            file_path,
            line,
            DiagnosticSeverity::Error,
            format!("Undefined substitution referenced: \"{name}\"."),
        )
        .with_subject(DiagnosticCategory::UndefinedSubstitution, name)
    }

    /// `Unknown target name: "name".` at error level.
    #[must_use]
    pub fn unknown_target(file_path: &Path, line: usize, name: &str) -> Self {
        Self::new(
            file_path,
            line,
            DiagnosticSeverity::Error,
            format!("Unknown target name: \"{name}\"."),
        )
        .with_subject(DiagnosticCategory::UnknownTarget, name)
    }

    /// `Unknown interpreted text role "name".` at error level.
    #[must_use]
    pub fn unknown_role(file_path: &Path, line: usize, name: &str) -> Self {
        Self::new(
            file_path,
            line,
            DiagnosticSeverity::Error,
            format!("Unknown interpreted text role \"{name}\"."),
        )
        .with_subject(DiagnosticCategory::UnknownRole, name)
    }

    /// `Unknown directive type "name".` at error level.
    #[must_use]
    pub fn unknown_directive(file_path: &Path, line: usize, name: &str) -> Self {
        Self::new(
            file_path,
            line,
            DiagnosticSeverity::Error,
            format!("Unknown directive type \"{name}\"."),
        )
        .with_subject(DiagnosticCategory::UnknownDirective, name)
    }

    /// Returns the subject name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns true if the validator gave a line for this diagnostic.
    #[must_use]
    pub const fn has_location(&self) -> bool {
        self.line > 0
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: ({}) {}",
            self.file_path.display(),
            self.line,
            self.severity,
            self.message
        )
    }
}
