use rst_config::ConfigDiscovery;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project tree.
///
/// Paths are canonical so they compare equal to what discovery returns on
/// platforms where the temp directory sits behind a symlink.
pub struct ProjectFixture {
    _dir: TempDir,
    root: PathBuf,
}

impl ProjectFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        Self { _dir: dir, root }
    }

    /// Write `contents` to `relative`, creating parent directories.
    #[must_use]
    pub fn file(self, relative: &str, contents: &str) -> Self {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }

    /// Write an empty `conf.py` in `dir` (relative to the root).
    #[must_use]
    pub fn artifact(self, dir: &str) -> Self {
        let relative = if dir.is_empty() {
            "conf.py".to_string()
        } else {
            format!("{dir}/conf.py")
        };
        self.file(&relative, "")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Discovery for `conf.py`, bounded at the fixture root.
    pub fn discovery(&self) -> ConfigDiscovery {
        ConfigDiscovery::new(vec!["conf.py".to_string()]).with_boundary(Some(self.root.clone()))
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
