//! Explicit environment for spawned `alr` processes

use std::collections::{BTreeMap, BTreeSet};
use std::process::Command;

/// Variable naming the configuration root `alr` reads its settings from.
pub const CONFIG_VAR: &str = "ALR_CONFIG";

/// Toggle asking the test driver to disable distribution detection.
pub const DISABLE_DISTRO_VAR: &str = "ALIRE_DISABLE_DISTRO";

/// Environment-variable overrides applied to every invocation.
///
/// Variables not mentioned here are inherited from the test process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    removed: BTreeSet<String>,
}

impl Environment {
    /// An empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the variables of the current process.
    pub fn inherited() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build overrides from key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            removed: BTreeSet::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.removed.remove(&key);
        self.vars.insert(key, value.into());
        self
    }

    /// Remove a variable, also hiding any inherited value from the child.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.vars.remove(key);
        self.removed.insert(key.to_string());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the caller asked for distribution detection to be disabled.
    pub fn distro_detection_disabled(&self) -> bool {
        self.get(DISABLE_DISTRO_VAR) == Some("true")
    }

    pub(crate) fn apply(&self, cmd: &mut Command) {
        for key in &self.removed {
            cmd.env_remove(key);
        }
        cmd.envs(&self.vars);
    }
}
