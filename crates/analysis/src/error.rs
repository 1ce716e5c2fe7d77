use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Failures that prevent a document from being validated at all.
///
/// These are propagated as-is; reconciliation never sees them.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("validator failed on {path}: {message}")]
    Validator { path: PathBuf, message: String },
}
