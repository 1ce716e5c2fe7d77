//! Run-scoped cache of harvested registries, keyed by artifact path.

use dashmap::DashMap;
use rst_config::{harvest, ArtifactExecutor, ConfigurationArtifact, Harvest, ModifiedMarker};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// One artifact's harvest, valid for a single modification marker.
#[derive(Debug)]
struct HarvestSlot {
    marker: ModifiedMarker,
    harvest: OnceLock<Harvest>,
}

/// Shares one harvest per artifact across every document it governs.
///
/// Concurrent requests for the same artifact and marker coalesce: the first
/// caller executes the artifact, the rest block until its result is ready.
/// A changed marker replaces the slot, so edits made during a long-lived
/// session are picked up on the next request.
#[derive(Debug, Default)]
pub struct HarvestCache {
    slots: DashMap<PathBuf, Arc<HarvestSlot>>,
}

impl HarvestCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The harvest for `artifact`, executing it at most once per marker.
    #[must_use]
    pub fn get_or_harvest(
        &self,
        executor: &dyn ArtifactExecutor,
        artifact: &ConfigurationArtifact,
    ) -> Harvest {
        let slot = self.slot_for(artifact);
        slot.harvest
            .get_or_init(|| {
                tracing::debug!(artifact = %artifact.path().display(), "Harvest cache miss");
                harvest(executor, artifact)
            })
            .clone()
    }

    /// Fetch or install the slot for the artifact's current marker.
    ///
    /// The map guard is released before the slot is initialized so a slow
    /// harvest never blocks lookups for other artifacts.
    fn slot_for(&self, artifact: &ConfigurationArtifact) -> Arc<HarvestSlot> {
        let mut entry = self
            .slots
            .entry(artifact.path().to_path_buf())
            .or_insert_with(|| Arc::new(HarvestSlot::new(artifact.marker())));

        if entry.marker != artifact.marker() {
            tracing::debug!(artifact = %artifact.path().display(), "Artifact changed, invalidating harvest");
            *entry = Arc::new(HarvestSlot::new(artifact.marker()));
        }
        Arc::clone(&entry)
    }

    /// Whether a harvest for `path` has completed.
    #[must_use]
    pub fn is_harvested(&self, path: &Path) -> bool {
        self.slots
            .get(path)
            .is_some_and(|slot| slot.harvest.get().is_some())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl HarvestSlot {
    fn new(marker: ModifiedMarker) -> Self {
        Self {
            marker,
            harvest: OnceLock::new(),
        }
    }
}
