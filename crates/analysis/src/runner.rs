use crate::{HarvestCache, InjectedSymbols, MarkupValidator, Result, ValidationError};
use rst_config::{ArtifactExecutor, ConfigDiscovery, ConfigurationArtifact, Harvest, HarvestWarning};
use rst_types::{Diagnostic, SymbolRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A document's validator output before reconciliation.
#[derive(Debug, Clone)]
pub struct RawValidation {
    pub path: PathBuf,
    /// The governing artifact, `None` on a discovery miss
    pub artifact: Option<PathBuf>,
    /// The registry injected into the validator
    pub registry: Arc<SymbolRegistry>,
    /// Diagnostics exactly as the validator produced them
    pub diagnostics: Vec<Diagnostic>,
    pub warning: Option<HarvestWarning>,
}

/// Registry resolution for one document.
#[derive(Debug, Clone)]
pub struct ResolvedScope {
    pub artifact: Option<ConfigurationArtifact>,
    pub harvest: Harvest,
}

/// Resolves a document's scope and runs the validator with it injected.
pub struct ValidationRunner {
    discovery: ConfigDiscovery,
    executor: Arc<dyn ArtifactExecutor>,
    validator: Arc<dyn MarkupValidator>,
    cache: HarvestCache,
    ignored_roles: Vec<String>,
    ignored_directives: Vec<String>,
}

impl ValidationRunner {
    #[must_use]
    pub fn new(
        discovery: ConfigDiscovery,
        executor: Arc<dyn ArtifactExecutor>,
        validator: Arc<dyn MarkupValidator>,
    ) -> Self {
        Self {
            discovery,
            executor,
            validator,
            cache: HarvestCache::new(),
            ignored_roles: Vec::new(),
            ignored_directives: Vec::new(),
        }
    }

    /// Roles and directives the validator should accept in every scope.
    #[must_use]
    pub fn with_ignored(mut self, roles: Vec<String>, directives: Vec<String>) -> Self {
        self.ignored_roles = roles;
        self.ignored_directives = directives;
        self
    }

    #[must_use]
    pub const fn cache(&self) -> &HarvestCache {
        &self.cache
    }

    /// Find the governing artifact and its (cached) harvest.
    #[must_use]
    pub fn resolve(&self, document_path: &Path) -> ResolvedScope {
        match self.discovery.find_governing_artifact(document_path) {
            Some(artifact) => {
                let harvest = self.cache.get_or_harvest(self.executor.as_ref(), &artifact);
                ResolvedScope {
                    artifact: Some(artifact),
                    harvest,
                }
            }
            None => ResolvedScope {
                artifact: None,
                harvest: Harvest::empty(),
            },
        }
    }

    /// Read and validate the document at `document_path`.
    #[tracing::instrument(skip(self), fields(document = %document_path.display()))]
    pub fn validate(&self, document_path: &Path) -> Result<RawValidation> {
        let text = std::fs::read_to_string(document_path).map_err(|source| ValidationError::Read {
            path: document_path.to_path_buf(),
            source,
        })?;
        self.validate_text(document_path, &text)
    }

    /// Validate `text` as if it lived at `document_path`.
    pub fn validate_text(&self, document_path: &Path, text: &str) -> Result<RawValidation> {
        let scope = self.resolve(document_path);
        let symbols = InjectedSymbols::from_registry(
            &scope.harvest.registry,
            &self.ignored_roles,
            &self.ignored_directives,
        );

        let diagnostics = self.validator.validate(document_path, text, &symbols)?;
        tracing::debug!(raw = diagnostics.len(), "Validator finished");

        Ok(RawValidation {
            path: document_path.to_path_buf(),
            artifact: scope.artifact.map(|a| a.path().to_path_buf()),
            registry: scope.harvest.registry,
            diagnostics,
            warning: scope.harvest.warning,
        })
    }
}

impl std::fmt::Debug for ValidationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRunner")
            .field("discovery", &self.discovery)
            .field("cache", &self.cache)
            .field("ignored_roles", &self.ignored_roles)
            .field("ignored_directives", &self.ignored_directives)
            .finish_non_exhaustive()
    }
}
