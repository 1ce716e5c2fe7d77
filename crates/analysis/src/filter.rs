use regex::Regex;
use rst_types::{Diagnostic, DiagnosticSeverity};

/// User-requested filtering applied to the reconciled list only.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticFilter {
    report_level: DiagnosticSeverity,
    ignore_messages: Option<Regex>,
}

impl DiagnosticFilter {
    #[must_use]
    pub const fn new(report_level: DiagnosticSeverity) -> Self {
        Self {
            report_level,
            ignore_messages: None,
        }
    }

    /// Drop diagnostics whose message matches `pattern`.
    pub fn with_ignored_messages(mut self, pattern: Option<&str>) -> Result<Self, regex::Error> {
        self.ignore_messages = pattern.map(Regex::new).transpose()?;
        Ok(self)
    }

    #[must_use]
    pub fn keeps(&self, diagnostic: &Diagnostic) -> bool {
        diagnostic.severity >= self.report_level
            && !self
                .ignore_messages
                .as_ref()
                .is_some_and(|re| re.is_match(&diagnostic.message))
    }

    #[must_use]
    pub fn apply(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diagnostics.into_iter().filter(|d| self.keeps(d)).collect()
    }
}
