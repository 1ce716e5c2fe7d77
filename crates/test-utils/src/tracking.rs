//! A fake harvester for verifying harvest sharing and caching.
//!
//! ## Usage
//!
//! ```ignore
//! let executor = RecordingExecutor::new()
//!     .script(fixture.path("conf.py"), HarvestOutput { roles: vec!["issue".into()], ..Default::default() });
//!
//! let checkpoint = executor.checkpoint();
//! checker.check(&fixture.path("index.rst"))?;
//! assert_eq!(executor.count_since(&fixture.path("conf.py"), checkpoint), 1);
//! ```

use rst_config::{ArtifactExecutor, ConfigurationArtifact, HarvestError, HarvestOutput};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Scripted reply for one artifact.
#[derive(Debug, Clone)]
enum Reply {
    Output(HarvestOutput),
    Raise(String),
}

/// Replies with scripted outputs per artifact path and logs every execution.
///
/// Artifacts without a script harvest as empty.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    replies: HashMap<PathBuf, Reply>,
    executions: Mutex<Vec<PathBuf>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `artifact` with `output`.
    #[must_use]
    pub fn script(mut self, artifact: impl Into<PathBuf>, output: HarvestOutput) -> Self {
        self.replies.insert(artifact.into(), Reply::Output(output));
        self
    }

    /// Make `artifact` fail as if it raised `message`.
    #[must_use]
    pub fn raise(mut self, artifact: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        self.replies.insert(artifact.into(), Reply::Raise(message.into()));
        self
    }

    /// Current position in the execution log.
    pub fn checkpoint(&self) -> usize {
        self.executions.lock().unwrap().len()
    }

    /// Executions of `artifact` since `checkpoint`.
    pub fn count_since(&self, artifact: &Path, checkpoint: usize) -> usize {
        self.executions.lock().unwrap()[checkpoint..]
            .iter()
            .filter(|p| p.as_path() == artifact)
            .count()
    }

    /// Executions of `artifact` over the executor's lifetime.
    pub fn total_count(&self, artifact: &Path) -> usize {
        self.count_since(artifact, 0)
    }

    /// Every execution so far, in order.
    pub fn executions(&self) -> Vec<PathBuf> {
        self.executions.lock().unwrap().clone()
    }
}

impl ArtifactExecutor for RecordingExecutor {
    fn execute(&self, artifact: &ConfigurationArtifact) -> Result<HarvestOutput, HarvestError> {
        self.executions.lock().unwrap().push(artifact.path().to_path_buf());
        match self.replies.get(artifact.path()) {
            Some(Reply::Output(output)) => Ok(output.clone()),
            Some(Reply::Raise(message)) => Err(HarvestError::Raised {
                artifact: artifact.path().to_path_buf(),
                message: message.clone(),
            }),
            None => Ok(HarvestOutput::default()),
        }
    }
}
