use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Snapshot of an artifact's on-disk state, used to invalidate cached harvests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModifiedMarker {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl ModifiedMarker {
    /// Read the marker for `path`. Missing metadata yields a marker that never
    /// matches a real file, forcing a fresh harvest.
    #[must_use]
    pub fn read(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) => Self {
                modified: meta.modified().ok(),
                len: meta.len(),
            },
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Could not stat artifact");
                Self {
                    modified: None,
                    len: 0,
                }
            }
        }
    }
}

/// A configuration artifact governing a directory subtree.
///
/// Identity is the absolute path; the governed directory is its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigurationArtifact {
    path: Arc<Path>,
    marker: ModifiedMarker,
}

impl ConfigurationArtifact {
    /// Describe the artifact at `path`, reading its current marker.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let marker = ModifiedMarker::read(&path);
        Self {
            path: Arc::from(path),
            marker,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared handle to the path, used as the origin of harvested symbols.
    #[must_use]
    pub fn shared_path(&self) -> Arc<Path> {
        Arc::clone(&self.path)
    }

    /// Directory whose subtree this artifact governs.
    #[must_use]
    pub fn governed_dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    #[must_use]
    pub const fn marker(&self) -> ModifiedMarker {
        self.marker
    }

    /// A copy of this artifact with its marker re-read from disk.
    #[must_use]
    pub fn refreshed(&self) -> Self {
        Self {
            path: Arc::clone(&self.path),
            marker: ModifiedMarker::read(&self.path),
        }
    }
}
