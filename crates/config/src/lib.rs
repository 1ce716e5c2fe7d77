//! Tool settings, configuration artifact discovery and symbol harvesting.
//!
//! A document is governed by the nearest `conf.py` (or other configured
//! artifact name) above it. [`ConfigDiscovery`] finds it, an
//! [`ArtifactExecutor`] runs it in isolation, and [`harvest`] turns what it
//! declared into a [`rst_types::SymbolRegistry`].

mod artifact;
pub mod declarations;
mod discovery;
mod error;
mod executor;
mod loader;
mod settings;

pub use artifact::{ConfigurationArtifact, ModifiedMarker};
pub use discovery::ConfigDiscovery;
pub use error::{ConfigError, HarvestError, Result};
pub use executor::{
    build_registry, harvest, ArtifactExecutor, Harvest, HarvestOutput, HarvestWarning,
    InterpreterExecutor,
};
pub use loader::{find_settings, load_settings, load_settings_from_str};
pub use settings::{IgnoreSettings, Settings, DEFAULT_ARTIFACT_NAMES, DEFAULT_INTERPRETER};
