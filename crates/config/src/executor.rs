//! Executing configuration artifacts and turning what they declare into a
//! [`SymbolRegistry`].

use crate::declarations::parse_declarations;
use crate::{ConfigurationArtifact, HarvestError};
use rst_types::{SymbolDefinition, SymbolRegistry};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Driver run by the interpreter; see the module docs inside the script.
const HARVEST_DRIVER: &str = include_str!("harvest.py");

/// Raw record of what one artifact declared during execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HarvestOutput {
    /// Roles registered through the extension-registration API
    pub roles: Vec<String>,
    /// Directives registered through the extension-registration API
    pub directives: Vec<String>,
    /// Convention text blocks (`rst_prolog`, `rst_epilog`) by variable name
    pub text_blocks: BTreeMap<String, String>,
    /// `html_context["substitutions"]`, name to replacement text
    pub substitutions: BTreeMap<String, String>,
    /// Last line of the exception raised by the artifact, if any
    pub error: Option<String>,
}

/// Runs an artifact in isolation and reports its declarations.
///
/// Implementations must not share mutable state between artifacts.
pub trait ArtifactExecutor: Send + Sync {
    fn execute(&self, artifact: &ConfigurationArtifact) -> Result<HarvestOutput, HarvestError>;
}

/// Executes artifacts with an external interpreter, one process per artifact.
#[derive(Debug, Clone)]
pub struct InterpreterExecutor {
    interpreter: String,
}

impl InterpreterExecutor {
    #[must_use]
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl ArtifactExecutor for InterpreterExecutor {
    #[tracing::instrument(skip(self), fields(artifact = %artifact.path().display(), interpreter = %self.interpreter))]
    fn execute(&self, artifact: &ConfigurationArtifact) -> Result<HarvestOutput, HarvestError> {
        let output = Command::new(&self.interpreter)
            .arg("-c")
            .arg(HARVEST_DRIVER)
            .arg(artifact.path())
            .current_dir(artifact.governed_dir())
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| HarvestError::Spawn {
                interpreter: self.interpreter.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(HarvestError::Exit {
                artifact: artifact.path().to_path_buf(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let harvested: HarvestOutput =
            serde_json::from_slice(&output.stdout).map_err(|e| HarvestError::Malformed {
                artifact: artifact.path().to_path_buf(),
                message: e.to_string(),
            })?;

        if let Some(message) = &harvested.error {
            return Err(HarvestError::Raised {
                artifact: artifact.path().to_path_buf(),
                message: message.clone(),
            });
        }

        tracing::debug!(
            roles = harvested.roles.len(),
            directives = harvested.directives.len(),
            text_blocks = harvested.text_blocks.len(),
            "Artifact executed"
        );
        Ok(harvested)
    }
}

/// Warning surfaced when an artifact could not be harvested.
///
/// Reported alongside, never inside, a document's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestWarning {
    pub artifact: PathBuf,
    pub message: String,
}

impl std::fmt::Display for HarvestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not harvest symbols from {}: {}",
            self.artifact.display(),
            self.message
        )
    }
}

/// Result of harvesting one artifact.
#[derive(Debug, Clone)]
pub struct Harvest {
    pub registry: Arc<SymbolRegistry>,
    pub warning: Option<HarvestWarning>,
}

impl Harvest {
    /// The harvest for documents with no governing artifact.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            registry: Arc::new(SymbolRegistry::empty()),
            warning: None,
        }
    }
}

/// Execute `artifact` and build its registry.
///
/// Fails closed: when execution fails the registry is empty and the failure is
/// returned as a warning, so nothing is suppressed on the strength of a
/// half-read configuration.
#[must_use]
pub fn harvest(executor: &dyn ArtifactExecutor, artifact: &ConfigurationArtifact) -> Harvest {
    match executor.execute(artifact) {
        Ok(output) => Harvest {
            registry: Arc::new(build_registry(artifact, &output)),
            warning: None,
        },
        Err(e) => {
            tracing::warn!(artifact = %artifact.path().display(), error = %e, "Harvest failed");
            Harvest {
                registry: Arc::new(SymbolRegistry::from_definitions(
                    Some(artifact.shared_path()),
                    std::iter::empty(),
                )),
                warning: Some(HarvestWarning {
                    artifact: artifact.path().to_path_buf(),
                    message: e.to_string(),
                }),
            }
        }
    }
}

/// Merge everything an artifact declared into one registry.
#[must_use]
pub fn build_registry(artifact: &ConfigurationArtifact, output: &HarvestOutput) -> SymbolRegistry {
    let origin = artifact.shared_path();

    let roles = output.roles.iter().map(SymbolDefinition::role);
    let directives = output.directives.iter().map(SymbolDefinition::directive);
    let blocks = output
        .text_blocks
        .values()
        .map(String::as_str)
        .flat_map(parse_declarations);
    let context = output.substitutions.keys().map(SymbolDefinition::substitution);

    let definitions: Vec<SymbolDefinition> = roles
        .chain(directives)
        .chain(blocks)
        .chain(context)
        .map(|def| def.with_origin(Arc::clone(&origin)))
        .collect();

    let registry = SymbolRegistry::from_definitions(Some(origin), definitions);
    tracing::debug!(symbols = registry.len(), "Registry built");
    registry
}
