//! Manifest and lockfile mutation for the alr test driver
//!
//! Test cases need to put a crate's `alire.toml` into a known state without
//! going through `alr` itself, or the assertions would only check `alr`
//! against its own edits. This crate edits the `[[depends-on]]` and
//! `[[pins]]` array-of-tables sections directly and can alternatively
//! delegate the same edit to the `alr` command line.
//!
//! - [`ManifestDocument`]: the manifest as an ordered list of verbatim text
//!   and array sections; unmodified documents render byte for byte
//! - [`PinTarget`], [`SourceOptions`], [`Dependency`]: what a pin or a
//!   dependency points at
//! - [`CrateRoot`]: the operations, bound to one crate directory
//!
//! After every manual edit the lockfile's timestamps are reset to the epoch
//! so `alr` notices the manifest changed.

pub mod crate_root;
pub mod document;
pub mod error;
pub mod source;

pub use crate_root::{CrateKind, CrateRoot, DependencyRequest, EditOptions};
pub use document::{ArraySection, DEPENDS_ON, Entry, EntryValue, ManifestDocument, PINS};
pub use error::{Error, Result};
pub use source::{Dependency, GitRef, PinTarget, SourceOptions, VERSION_OPERATORS};
