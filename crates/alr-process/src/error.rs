//! Error types for alr invocations

use std::path::PathBuf;

/// Errors that can occur while running `alr`
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The executable could not be started at all
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        /// Program that was being started
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Subprocess exited with non-zero status
    #[error("The following command:\n  {command}\nExited with status code {status}\nOutput:\n{output}")]
    InvocationFailed {
        /// Full, shell-quoted command line
        command: String,
        /// Exit code, or -1 when terminated by a signal
        status: i32,
        /// Captured and normalized output
        output: String,
    },

    /// Output did not contain what the caller was looking for
    #[error("Unexpected alr output, {what}:\n{output}")]
    UnexpectedOutput {
        /// What could not be found
        what: String,
        /// The output that was searched
        output: String,
    },
}

/// Result type alias for alr invocations
pub type Result<T> = std::result::Result<T, Error>;
