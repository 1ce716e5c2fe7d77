//! Checking documents end to end, singly or as a parallel batch.

use crate::{reconcile, DiagnosticFilter, Result, ValidationRunner};
use rayon::prelude::*;
use rst_config::HarvestWarning;
use rst_types::Diagnostic;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Final result for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub artifact: Option<PathBuf>,
    /// Reconciled and filtered diagnostics, in validator order
    pub diagnostics: Vec<Diagnostic>,
    /// How many diagnostics reconciliation proved to be false positives
    pub suppressed: usize,
    /// Harvest failure for the governing artifact, reported separately
    pub warning: Option<HarvestWarning>,
}

/// Cooperative cancellation for a running batch.
///
/// Checked between documents; a document already in progress completes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// One entry per document that was started, in input order
    pub results: Vec<(PathBuf, Result<DocumentReport>)>,
    /// True when the batch stopped before every document was checked
    pub cancelled: bool,
}

/// Validates, reconciles and filters documents.
#[derive(Debug)]
pub struct Checker {
    runner: ValidationRunner,
    filter: DiagnosticFilter,
}

impl Checker {
    #[must_use]
    pub fn new(runner: ValidationRunner) -> Self {
        Self {
            runner,
            filter: DiagnosticFilter::default(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: DiagnosticFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn runner(&self) -> &ValidationRunner {
        &self.runner
    }

    /// Check one document.
    pub fn check(&self, document_path: &Path) -> Result<DocumentReport> {
        let raw = self.runner.validate(document_path)?;
        let reconciled = reconcile(raw.diagnostics, &raw.registry);

        Ok(DocumentReport {
            path: raw.path,
            artifact: raw.artifact,
            diagnostics: self.filter.apply(reconciled.diagnostics),
            suppressed: reconciled.suppressed.len(),
            warning: raw.warning,
        })
    }

    /// Check `paths` in parallel.
    ///
    /// Documents sharing an artifact share one harvest. Once `token` is
    /// cancelled no further documents start.
    #[must_use]
    #[tracing::instrument(skip_all, fields(documents = paths.len()))]
    pub fn check_batch(&self, paths: &[PathBuf], token: &CancellationToken) -> BatchOutcome {
        let results: Vec<Option<(PathBuf, Result<DocumentReport>)>> = paths
            .par_iter()
            .map(|path| {
                if token.is_cancelled() {
                    return None;
                }
                Some((path.clone(), self.check(path)))
            })
            .collect();

        let started = results.iter().filter(|r| r.is_some()).count();
        let cancelled = started < paths.len();
        if cancelled {
            tracing::info!(started, total = paths.len(), "Batch cancelled");
        }

        BatchOutcome {
            results: results.into_iter().flatten().collect(),
            cancelled,
        }
    }
}
