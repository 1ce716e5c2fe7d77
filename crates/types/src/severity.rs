//! Severity types for diagnostics.

use std::str::FromStr;

/// Diagnostic severity level for display.
///
/// Mirrors the four system-message levels of the markup validator. Variants
/// are ordered from least to most severe so a report level can be applied
/// with a plain comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DiagnosticSeverity {
    /// Informational message (validator level 1)
    #[default]
    Info,
    /// Potential problem (validator level 2)
    Warning,
    /// Problem that produces wrong output (validator level 3)
    Error,
    /// Problem that aborts processing of the construct (validator level 4)
    Severe,
}

impl DiagnosticSeverity {
    /// Map a numeric validator level to a severity.
    ///
    /// Levels below 1 are treated as informational and levels above 4 as severe.
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Self::Info,
            2 => Self::Warning,
            3 => Self::Error,
            _ => Self::Severe,
        }
    }

    /// The numeric validator level for this severity.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Info => 1,
            Self::Warning => 2,
            Self::Error => 3,
            Self::Severe => 4,
        }
    }

    /// Returns true if this severity indicates an error.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Severe)
    }

    /// Returns true if this severity is at least a warning.
    #[must_use]
    pub const fn is_warning_or_higher(self) -> bool {
        !matches!(self, Self::Info)
    }
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Severe => write!(f, "severe"),
        }
    }
}

/// Error returned when a severity name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverity(pub String);

impl std::fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown severity '{}' (expected info, warning, error or severe)",
            self.0
        )
    }
}

impl std::error::Error for UnknownSeverity {}

impl FromStr for DiagnosticSeverity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" | "1" => Ok(Self::Info),
            "warning" | "2" => Ok(Self::Warning),
            "error" | "3" => Ok(Self::Error),
            "severe" | "4" => Ok(Self::Severe),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}
