//! Filesystem primitives for the alr test driver
//!
//! Provides whole-file reads and atomic overwrites, recursive directory
//! copies, and the lockfile timestamp reset that makes a hand-edited
//! manifest look newer than its lockfile.

pub mod constants;
pub mod error;
pub mod io;

pub use constants::AlrPath;
pub use error::{Error, Result};
pub use io::{absolute_dir, copy_dir_all, make_stale, read_text, write_atomic, write_text};
