//! Error types for alr-sandbox

use std::path::PathBuf;

/// Result type for alr-sandbox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while staging a sandbox
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid index description for {name}: {reason}")]
    InvalidIndexDescription { name: String, reason: String },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("Failed to parse driver config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Failed to serialize index descriptor for {name}: {message}")]
    Serialize { name: String, message: String },

    /// Filesystem error from alr-fs
    #[error(transparent)]
    Fs(#[from] alr_fs::Error),

    /// Invocation error from alr-process
    #[error(transparent)]
    Process(#[from] alr_process::Error),
}

impl Error {
    pub fn invalid_index(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIndexDescription {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
