//! Shared test utilities for rst-check crates.
//!
//! - [`ProjectFixture`]: a temporary project tree with artifacts and documents
//! - [`RecordingExecutor`]: a fake harvester that counts executions
//! - [`ScriptedValidator`]: a fake markup validator with docutils wording
//! - [`assertions`]: diagnostic formatting for snapshots
//! - [`python`]: finding an interpreter for tests that run the embedded drivers

#![allow(
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod assertions;
mod fixtures;
pub mod python;
mod tracking;
mod validator;

pub use fixtures::ProjectFixture;
pub use tracking::RecordingExecutor;
pub use validator::ScriptedValidator;
