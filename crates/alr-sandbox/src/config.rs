//! Driver configuration
//!
//! The driver needs two things from its surroundings: the `alr` executable
//! to exercise and the root of the shared fixtures tree. Both have defaults,
//! can be read from a TOML file and can be overridden from the environment:
//!
//! ```toml
//! executable = "/opt/alire/bin/alr"
//! fixtures_root = "fixtures"
//! ```

use std::path::{Path, PathBuf};

use alr_process::{Environment, Invoker};
use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable overriding [`DriverConfig::executable`]
pub const EXECUTABLE_VAR: &str = "ALR_TESTSUITE_EXECUTABLE";
/// Environment variable overriding [`DriverConfig::fixtures_root`]
pub const FIXTURES_VAR: &str = "ALR_TESTSUITE_FIXTURES";

fn default_executable() -> PathBuf {
    PathBuf::from("alr")
}

fn default_fixtures_root() -> PathBuf {
    PathBuf::from("fixtures")
}

/// Settings shared by every test case
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// The `alr` executable; a bare name is looked up on `PATH`
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Root of the shared fixtures tree
    #[serde(default = "default_fixtures_root")]
    pub fixtures_root: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            fixtures_root: default_fixtures_root(),
        }
    }
}

impl DriverConfig {
    /// Parse a configuration from TOML content.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a configuration file.
    ///
    /// A relative `fixtures_root` is resolved against the directory holding
    /// the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = alr_fs::read_text(path)?;
        let mut config = Self::parse(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        if config.fixtures_root.is_relative() {
            if let Some(base) = path.parent() {
                config.fixtures_root = base.join(&config.fixtures_root);
            }
        }

        tracing::debug!(path = %path.display(), ?config, "Loaded driver config");
        Ok(config)
    }

    /// Defaults with the process environment applied on top.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply [`EXECUTABLE_VAR`] and [`FIXTURES_VAR`] as looked up by `lookup`.
    ///
    /// Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(exe) = non_empty(EXECUTABLE_VAR) {
            self.executable = PathBuf::from(exe);
        }
        if let Some(root) = non_empty(FIXTURES_VAR) {
            self.fixtures_root = PathBuf::from(root);
        }
        self
    }

    /// An invoker for the configured executable carrying a snapshot of the
    /// test process environment.
    pub fn invoker(&self) -> Invoker {
        Invoker::new(&self.executable).with_env(Environment::inherited())
    }

    pub fn fixtures(&self) -> Fixtures {
        Fixtures::new(&self.fixtures_root)
    }
}

/// Root of the shared fixtures tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixtures {
    root: PathBuf,
}

impl Fixtures {
    /// A relative `root` is resolved against the current directory here, so
    /// paths handed to `alr` never depend on where it runs.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A path under the fixtures root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
