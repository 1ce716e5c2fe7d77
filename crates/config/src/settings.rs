use rst_types::DiagnosticSeverity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Interpreter used to execute configuration artifacts when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Artifact file names recognized when none are configured.
pub const DEFAULT_ARTIFACT_NAMES: &[&str] = &["conf.py"];

/// Tool settings loaded from `.rst-check.yml` and friends.
///
/// Every field is optional; accessors supply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Command used to execute configuration artifacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// File names recognized as configuration artifacts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_names: Option<Vec<String>>,

    /// Directory where artifact discovery stops walking upward.
    /// Relative paths are resolved against the settings file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<PathBuf>,

    /// Minimum severity reported (`info`, `warning`, `error`, `severe`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_level: Option<String>,

    /// Accept Sphinx's built-in roles and directives when Sphinx is installed
    /// (default `true`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sphinx_builtins: Option<bool>,

    #[serde(skip_serializing_if = "IgnoreSettings::is_empty")]
    pub ignore: IgnoreSettings,
}

/// Names and messages the user asked to ignore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IgnoreSettings {
    /// Roles the validator treats as known in every scope
    pub roles: Vec<String>,
    /// Directives the validator treats as known in every scope
    pub directives: Vec<String>,
    /// Regular expression; diagnostics whose message matches are dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<String>,
}

impl IgnoreSettings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.directives.is_empty() && self.messages.is_none()
    }
}

impl Settings {
    #[must_use]
    pub fn interpreter(&self) -> &str {
        self.interpreter.as_deref().unwrap_or(DEFAULT_INTERPRETER)
    }

    #[must_use]
    pub fn artifact_names(&self) -> Vec<String> {
        self.artifact_names.clone().unwrap_or_else(|| {
            DEFAULT_ARTIFACT_NAMES
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }

    #[must_use]
    pub fn sphinx_builtins(&self) -> bool {
        self.sphinx_builtins.unwrap_or(true)
    }

    /// The configured report level, `Info` when unset.
    ///
    /// Settings are validated on load, so an unparseable level only reaches
    /// here for hand-built settings; it falls back to `Info` which reports
    /// everything.
    #[must_use]
    pub fn report_level(&self) -> DiagnosticSeverity {
        self.report_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or_default()
    }

    /// Resolve the boundary against the directory holding the settings file.
    #[must_use]
    pub fn resolved_boundary(&self, base_dir: &Path) -> Option<PathBuf> {
        self.boundary.as_ref().map(|boundary| {
            if boundary.is_absolute() {
                boundary.clone()
            } else {
                base_dir.join(boundary)
            }
        })
    }

    /// Overlay command-line values on top of file settings.
    #[must_use]
    pub fn with_overrides(
        mut self,
        interpreter: Option<String>,
        boundary: Option<PathBuf>,
        report_level: Option<String>,
    ) -> Self {
        if interpreter.is_some() {
            self.interpreter = interpreter;
        }
        if boundary.is_some() {
            self.boundary = boundary;
        }
        if report_level.is_some() {
            self.report_level = report_level;
        }
        self
    }
}
