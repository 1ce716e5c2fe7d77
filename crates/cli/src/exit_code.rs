//! Exit codes for rst-check.
//!
//! Distinct codes let scripts and CI systems tell a document with problems
//! apart from a broken setup.

/// Exit codes used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - no diagnostics reported
    Success = 0,
    /// Diagnostics reported for at least one document
    DiagnosticsFound = 1,
    /// Settings error (unreadable or invalid settings file)
    ConfigError = 2,
    /// I/O error (document missing or unreadable)
    IoError = 4,
    /// The markup validator could not run
    ValidatorError = 5,
}

impl ExitCode {
    /// Exit the process with this exit code.
    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }

    /// Get the numeric value of this exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::DiagnosticsFound => write!(f, "diagnostics found"),
            Self::ConfigError => write!(f, "settings error"),
            Self::IoError => write!(f, "I/O error"),
            Self::ValidatorError => write!(f, "validator error"),
        }
    }
}
