//! Shared test utilities for the alr-testsuite workspace.
//!
//! Used as a dev-dependency by every crate's tests; never published.
//!
//! # Modules
//!
//! - [`fake_alr`]: scripted stand-in for the `alr` executable (Unix only)
//! - [`logging`]: tracing subscriber for test output

#[cfg(unix)]
pub mod fake_alr;
pub mod logging;

#[cfg(unix)]
pub use fake_alr::{Call, FakeAlr};
