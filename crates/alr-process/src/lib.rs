//! Invocation of the `alr` command-line tool
//!
//! This crate wraps `alr` as a blocking subprocess with the flag conventions
//! the test driver relies on:
//!
//! - `-n` (non-interactive) is always passed
//! - `-d` (raw diagnostics) and `-q` (quiet) are passed unless disabled
//! - a non-zero exit aborts with [`Error::InvocationFailed`] unless the
//!   caller opts out
//! - captured output is normalized to LF line endings
//!
//! The environment and working directory of each invocation are explicit
//! ([`Environment`], [`Invoker::in_dir`]) rather than inherited from
//! process-wide state.

pub mod env;
pub mod error;
pub mod invoke;
pub mod version;

pub use env::Environment;
pub use error::{Error, Result};
pub use invoke::{Invoker, ProcessResult, RunOptions};
pub use version::{VersionReport, version_report};
