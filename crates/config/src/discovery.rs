use crate::ConfigurationArtifact;
use dashmap::DashMap;
use std::path::{Path, PathBuf};

/// Finds the configuration artifact governing a document.
///
/// Walks from the document's directory towards the filesystem root (or the
/// configured boundary, which is itself still searched) and stops at the first
/// directory holding a recognized artifact. Lookups are cached per starting
/// directory; the artifact's modification marker is re-read on every hit so
/// callers always see the current on-disk state.
#[derive(Debug)]
pub struct ConfigDiscovery {
    artifact_names: Vec<String>,
    boundary: Option<PathBuf>,
    cache: DashMap<PathBuf, Option<PathBuf>>,
}

impl ConfigDiscovery {
    #[must_use]
    pub fn new(artifact_names: Vec<String>) -> Self {
        Self {
            artifact_names,
            boundary: None,
            cache: DashMap::new(),
        }
    }

    /// Stop walking upward once `boundary` has been searched.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Option<PathBuf>) -> Self {
        self.boundary = boundary.map(|b| absolute(&b));
        self
    }

    /// Find the artifact governing `document_path`, or `None` when no
    /// enclosing directory holds one.
    ///
    /// Candidates are ranked by distance from the document. When the document
    /// is reachable through a symlink or mount alias, both the literal and the
    /// canonical ancestor chains are searched; equidistant candidates resolve
    /// to the lexicographically smallest path.
    #[must_use]
    #[tracing::instrument(skip(self), fields(document = %document_path.display()))]
    pub fn find_governing_artifact(&self, document_path: &Path) -> Option<ConfigurationArtifact> {
        let start_dir = start_dir(document_path);

        if let Some(cached) = self.cache.get(&start_dir) {
            tracing::trace!(dir = %start_dir.display(), "Discovery cache hit");
            return cached.as_ref().map(ConfigurationArtifact::at);
        }

        let found = self.search(&start_dir);
        match &found {
            Some(path) => tracing::debug!(artifact = %path.display(), "Found governing artifact"),
            None => tracing::debug!("No governing artifact"),
        }
        self.cache.insert(start_dir, found.clone());
        found.map(ConfigurationArtifact::at)
    }

    fn search(&self, start_dir: &Path) -> Option<PathBuf> {
        let mut chains = vec![self.ancestor_chain(start_dir)];
        if let Ok(canonical) = std::fs::canonicalize(start_dir) {
            if canonical != start_dir {
                chains.push(self.ancestor_chain(&canonical));
            }
        }

        let depth_limit = chains.iter().map(Vec::len).max().unwrap_or(0);
        for depth in 0..depth_limit {
            let mut candidates: Vec<PathBuf> = chains
                .iter()
                .filter_map(|chain| chain.get(depth))
                .flat_map(|dir| self.artifact_names.iter().map(move |name| dir.join(name)))
                .filter(|candidate| candidate.is_file())
                .collect();

            candidates.sort();
            candidates.dedup();

            if candidates.len() > 1 {
                tracing::debug!(
                    depth,
                    candidates = ?candidates,
                    "Equidistant artifacts, choosing lexicographically smallest"
                );
            }
            if let Some(first) = candidates.into_iter().next() {
                return Some(first);
            }
        }

        None
    }

    /// Ancestors of `dir`, nearest first, truncated after the boundary.
    fn ancestor_chain(&self, dir: &Path) -> Vec<PathBuf> {
        let canonical_boundary = self
            .boundary
            .as_ref()
            .and_then(|b| std::fs::canonicalize(b).ok());

        let mut chain = Vec::new();
        for ancestor in dir.ancestors() {
            chain.push(ancestor.to_path_buf());
            let at_boundary = self.boundary.as_deref() == Some(ancestor)
                || canonical_boundary.as_deref() == Some(ancestor);
            if at_boundary {
                break;
            }
        }
        chain
    }
}

/// Directory the upward walk starts from: the document's parent, or the path
/// itself when it names a directory.
fn start_dir(document_path: &Path) -> PathBuf {
    let path = absolute(document_path);
    if path.is_dir() {
        return path;
    }
    path.parent().map_or(path.clone(), Path::to_path_buf)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn discovery(root: &Path) -> ConfigDiscovery {
        ConfigDiscovery::new(vec!["conf.py".to_string()]).with_boundary(Some(root.to_path_buf()))
    }

    fn canonical_tempdir() -> (tempfile::TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_find_in_document_dir() {
        let (_guard, root) = canonical_tempdir();
        fs::write(root.join("conf.py"), "").unwrap();

        let found = discovery(&root)
            .find_governing_artifact(&root.join("index.rst"))
            .unwrap();
        assert_eq!(found.path(), root.join("conf.py"));
        assert_eq!(found.governed_dir(), root);
    }

    #[test]
    fn test_find_in_ancestor_dir() {
        let (_guard, root) = canonical_tempdir();
        fs::write(root.join("conf.py"), "").unwrap();
        let nested = root.join("guide").join("advanced");
        fs::create_dir_all(&nested).unwrap();

        let found = discovery(&root)
            .find_governing_artifact(&nested.join("page.rst"))
            .unwrap();
        assert_eq!(found.path(), root.join("conf.py"));
    }

    #[test]
    fn test_nearest_artifact_wins() {
        let (_guard, root) = canonical_tempdir();
        fs::write(root.join("conf.py"), "").unwrap();
        let sub = root.join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("conf.py"), "").unwrap();

        let found = discovery(&root)
            .find_governing_artifact(&sub.join("page.rst"))
            .unwrap();
        assert_eq!(found.path(), sub.join("conf.py"));
    }

    #[test]
    fn test_not_found_within_boundary() {
        let (_guard, root) = canonical_tempdir();
        let sub = root.join("sub");
        fs::create_dir(&sub).unwrap();

        let found = discovery(&root).find_governing_artifact(&sub.join("page.rst"));
        assert!(found.is_none());
    }

    #[test]
    fn test_boundary_stops_walk() {
        let (_guard, root) = canonical_tempdir();
        fs::write(root.join("conf.py"), "").unwrap();
        let project = root.join("project");
        fs::create_dir(&project).unwrap();

        let found = discovery(&project).find_governing_artifact(&project.join("index.rst"));
        assert!(found.is_none(), "artifact above the boundary must not govern");
    }

    #[test]
    fn test_same_directory_names_tie_break_lexicographically() {
        let (_guard, root) = canonical_tempdir();
        fs::write(root.join("conf.py"), "").unwrap();
        fs::write(root.join("aaa_conf.py"), "").unwrap();

        let discovery = ConfigDiscovery::new(vec!["conf.py".to_string(), "aaa_conf.py".to_string()])
            .with_boundary(Some(root.clone()));
        let found = discovery
            .find_governing_artifact(&root.join("index.rst"))
            .unwrap();
        assert_eq!(found.path(), root.join("aaa_conf.py"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_aliasing_tie_break() {
        let (_guard, root) = canonical_tempdir();
        let a = root.join("a");
        let b = root.join("b");
        fs::create_dir_all(a.join("docs")).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("conf.py"), "").unwrap();
        fs::write(b.join("conf.py"), "").unwrap();
        std::os::unix::fs::symlink(a.join("docs"), b.join("docs")).unwrap();

        // Reached through b/docs, which really lives in a/docs: both
        // artifacts are one level up, so the smaller path wins.
        let found = discovery(&root)
            .find_governing_artifact(&b.join("docs").join("index.rst"))
            .unwrap();
        assert_eq!(found.path(), a.join("conf.py"));
    }

    #[test]
    fn test_cache_reflects_new_marker() {
        let (_guard, root) = canonical_tempdir();
        let conf = root.join("conf.py");
        fs::write(&conf, "a = 1\n").unwrap();
        let discovery = discovery(&root);

        let first = discovery.find_governing_artifact(&root.join("index.rst")).unwrap();
        fs::write(&conf, "a = 1\nb = 2\n").unwrap();
        let second = discovery.find_governing_artifact(&root.join("index.rst")).unwrap();

        assert_eq!(first.path(), second.path());
        assert_ne!(first.marker(), second.marker());
    }
}
