use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading tool settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings in {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("Unsupported settings format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Errors raised while executing a configuration artifact.
///
/// These never abort a run: the executor turns them into an empty registry
/// plus a warning for the documents in the artifact's scope.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to start interpreter '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{artifact} raised during execution: {message}")]
    Raised { artifact: PathBuf, message: String },

    #[error("interpreter exited with status {status} while executing {artifact}: {stderr}")]
    Exit {
        artifact: PathBuf,
        status: i32,
        stderr: String,
    },

    #[error("unparseable harvest output for {artifact}: {message}")]
    Malformed { artifact: PathBuf, message: String },
}
