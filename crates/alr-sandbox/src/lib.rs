//! Sandbox staging for the alr test driver
//!
//! Everything a test case needs before it can run `alr` in isolation:
//!
//! - [`DriverConfig`]: which executable to run and where the fixtures live
//! - [`prepare_env`]: a private configuration directory wired into the
//!   invoker's environment
//! - [`prepare_indexes`]: registry index descriptors inside that directory

pub mod config;
pub mod error;
pub mod index;
pub mod stage;

pub use config::{DriverConfig, Fixtures};
pub use error::{Error, Result};
pub use index::{IndexDescriptor, parse_index_descriptions, prepare_indexes};
pub use stage::prepare_env;
