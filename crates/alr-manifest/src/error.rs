//! Error types for alr-manifest

/// Result type for alr-manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing a manifest
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A removal targeted an entry that is not in the manifest
    #[error("Could not remove crate {crate_name} from [[{array}]] in manifest:\n{manifest}")]
    EntryNotFound {
        array: String,
        crate_name: String,
        manifest: String,
    },

    /// Mutually exclusive options were combined
    #[error("Conflicting options: {0}")]
    ConflictingOptions(String),

    #[error("Invalid {what}: {reason}")]
    InvalidValue { what: String, reason: String },

    /// A delegated edit was requested without letting `alr` update
    #[error("Update cannot be disabled when using the command-line interface ({operation})")]
    UpdateRequired { operation: String },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// Filesystem error from alr-fs
    #[error(transparent)]
    Fs(#[from] alr_fs::Error),

    /// Invocation error from alr-process
    #[error(transparent)]
    Process(#[from] alr_process::Error),
}

impl Error {
    pub fn invalid(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictingOptions(message.into())
    }

    /// Whether this is a validation failure raised before any mutation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ConflictingOptions(_) | Self::InvalidValue { .. })
    }
}
