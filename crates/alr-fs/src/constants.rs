//! Well-known file and directory names used by `alr`.

use std::path::Path;

/// Paths `alr` reads inside a crate root or a configuration directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlrPath {
    /// The crate manifest (`alire.toml`)
    Manifest,
    /// The resolved-solution lockfile (`alire.lock`)
    Lockfile,
    /// Directory holding one sub-directory per configured index
    IndexesDir,
    /// Descriptor file inside each index directory
    IndexDescriptor,
    /// Crate sources staged next to an index
    CratesDir,
}

impl AlrPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manifest => "alire.toml",
            Self::Lockfile => "alire.lock",
            Self::IndexesDir => "indexes",
            Self::IndexDescriptor => "index.toml",
            Self::CratesDir => "crates",
        }
    }
}

impl AsRef<Path> for AlrPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for AlrPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for AlrPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
