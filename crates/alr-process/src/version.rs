//! Facts extracted from `alr version`

use regex::Regex;

use crate::error::{Error, Result};
use crate::invoke::{Invoker, RunOptions};

/// Output of `alr version`, kept verbatim for later queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    output: String,
}

/// Run `alr version` (not quiet, so the full report is printed).
pub fn version_report(invoker: &Invoker) -> Result<VersionReport> {
    let result = invoker.run(&["version"], RunOptions::new().quiet(false))?;
    Ok(VersionReport::new(result.output))
}

impl VersionReport {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// False when the platform properties report an unknown distribution.
    pub fn distro_is_known(&self) -> bool {
        // Literal pattern, always valid
        let unknown = Regex::new(r"(?s)platform properties:.*DISTRO_UNKNOWN")
            .map(|re| re.is_match(&self.output))
            .unwrap_or(false);
        !unknown
    }

    /// Branch of the community index this `alr` expects, e.g. `stable-1.4.0`.
    pub fn index_branch(&self) -> Result<&str> {
        self.output
            .lines()
            .find(|line| line.starts_with("community index"))
            .and_then(|line| line.split(':').nth(1))
            .map(str::trim)
            .ok_or_else(|| self.unexpected("cannot find index version"))
    }

    /// Version component of [`index_branch`](Self::index_branch).
    pub fn index_version(&self) -> Result<&str> {
        self.index_branch()?
            .split('-')
            .nth(1)
            .ok_or_else(|| self.unexpected("index branch has no version component"))
    }

    fn unexpected(&self, what: &str) -> Error {
        Error::UnexpectedOutput {
            what: what.to_string(),
            output: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "\
APPLICATION
alr version (from build):       2.0.0
CONFIGURATION
community index branch:         stable-1.4.0
platform properties:
  distribution:                 DISTRO_UNKNOWN
";

    #[test]
    fn test_index_branch_and_version() {
        let report = VersionReport::new(REPORT);
        assert_eq!(report.index_branch().unwrap(), "stable-1.4.0");
        assert_eq!(report.index_version().unwrap(), "1.4.0");
    }

    #[test]
    fn test_distro_unknown() {
        assert!(!VersionReport::new(REPORT).distro_is_known());
        let known = REPORT.replace("DISTRO_UNKNOWN", "ubuntu");
        assert!(VersionReport::new(known).distro_is_known());
    }

    #[test]
    fn test_distro_unknown_must_follow_platform_section() {
        let report = VersionReport::new("DISTRO_UNKNOWN\nplatform properties:\n  ubuntu\n");
        assert!(report.distro_is_known());
    }

    #[test]
    fn test_missing_index_line() {
        let report = VersionReport::new("alr version: 2.0.0\n");
        let err = report.index_branch().unwrap_err();
        assert!(matches!(err, Error::UnexpectedOutput { .. }));
    }

    #[test]
    fn test_branch_without_dash() {
        let report = VersionReport::new("community index branch: master\n");
        assert_eq!(report.index_branch().unwrap(), "master");
        assert!(report.index_version().is_err());
    }
}
