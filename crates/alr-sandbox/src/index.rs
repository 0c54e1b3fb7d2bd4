//! Registry index registration
//!
//! Each index is described by an [`IndexDescriptor`] keyed by the index
//! name. Registering writes `<config>/indexes/<name>/index.toml`:
//!
//! ```toml
//! name = "my_index"
//! priority = 1
//! url = "/abs/path/to/fixtures/my_index"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use alr_fs::AlrPath;
use serde::{Deserialize, Serialize};

use crate::config::Fixtures;
use crate::{Error, Result};

/// How to stage one index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IndexDescriptor {
    /// Directory holding the index files; the index name when unset
    pub dir: Option<String>,
    /// Look for `dir` under the fixtures root instead of the working dir
    pub in_fixtures: bool,
    /// Copy the fixtures `crates` directory next to the index
    pub copy_crates_src: bool,
    /// Resolution priority; lower values are consulted first
    pub priority: i64,
}

impl Default for IndexDescriptor {
    fn default() -> Self {
        Self {
            dir: None,
            in_fixtures: true,
            copy_crates_src: false,
            priority: 1,
        }
    }
}

impl IndexDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn in_fixtures(mut self, in_fixtures: bool) -> Self {
        self.in_fixtures = in_fixtures;
        self
    }

    pub fn copy_crates_src(mut self, copy: bool) -> Self {
        self.copy_crates_src = copy;
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

/// On-disk `index.toml`
#[derive(Debug, Serialize)]
struct IndexFile<'a> {
    name: &'a str,
    priority: i64,
    url: String,
}

/// Parse index descriptions from TOML, one table per index.
///
/// ```toml
/// [my_index]
/// priority = 2
///
/// [local]
/// dir = "my_local_index"
/// in_fixtures = false
/// ```
///
/// Fields of the wrong type and unknown fields are rejected with
/// [`Error::InvalidIndexDescription`] naming the offending index.
pub fn parse_index_descriptions(content: &str) -> Result<BTreeMap<String, IndexDescriptor>> {
    let table: toml::Table = toml::from_str(content).map_err(|e| Error::Parse {
        what: "index descriptions".to_string(),
        message: e.message().to_string(),
    })?;

    let mut descriptions = BTreeMap::new();
    for (name, value) in table {
        if !value.is_table() {
            return Err(Error::invalid_index(name, "description must be a table"));
        }
        let descriptor: IndexDescriptor = value
            .try_into()
            .map_err(|e: toml::de::Error| Error::invalid_index(&name, e.message()))?;
        descriptions.insert(name, descriptor);
    }
    Ok(descriptions)
}

/// Populate `config_dir/indexes` with the described indexes.
///
/// Index sources resolve under the (absolute) `fixtures` root or, for
/// descriptors with `in_fixtures = false`, under `working_dir`. Each descriptor is validated
/// before anything is written for it.
pub fn prepare_indexes(
    config_dir: &Path,
    working_dir: &Path,
    fixtures: &Fixtures,
    descriptions: &BTreeMap<String, IndexDescriptor>,
) -> Result<()> {
    let indexes_dir = config_dir.join(AlrPath::IndexesDir);
    fs::create_dir_all(&indexes_dir).map_err(|e| alr_fs::Error::io(&indexes_dir, e))?;

    for (name, desc) in descriptions {
        validate_index_name(name)?;
        let files_dir = desc.dir.as_deref().unwrap_or(name);
        if files_dir.trim().is_empty() {
            return Err(Error::invalid_index(name, "\"dir\" must not be empty"));
        }

        let url: PathBuf = if desc.in_fixtures {
            fixtures.path(files_dir)
        } else {
            working_dir.join(files_dir)
        };

        if desc.copy_crates_src {
            // Kept outside the index tree, where the index loader would
            // report the sources as unexpected files.
            alr_fs::copy_dir_all(
                &fixtures.path(AlrPath::CratesDir),
                &working_dir.join(AlrPath::CratesDir),
            )?;
        }

        let index_dir = indexes_dir.join(name);
        fs::create_dir_all(&index_dir).map_err(|e| alr_fs::Error::io(&index_dir, e))?;

        let file = IndexFile {
            name,
            priority: desc.priority,
            url: url.to_string_lossy().into_owned(),
        };
        let content = toml::to_string(&file).map_err(|e| Error::Serialize {
            name: name.clone(),
            message: e.to_string(),
        })?;
        alr_fs::write_text(&index_dir.join(AlrPath::IndexDescriptor), &content)?;

        tracing::info!(index = %name, priority = desc.priority, url = %url.display(), "Registered index");
    }

    Ok(())
}

fn validate_index_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_index(name, "name must not be empty"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::invalid_index(
            name,
            "name must be a single path component",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_descriptor_defaults() {
        let desc = IndexDescriptor::default();
        assert_eq!(desc.dir, None);
        assert!(desc.in_fixtures);
        assert!(!desc.copy_crates_src);
        assert_eq!(desc.priority, 1);
    }

    #[test]
    fn test_parse_applies_defaults() {
        let parsed = parse_index_descriptions("[main]\n\n[extra]\npriority = 3\n").unwrap();
        assert_eq!(parsed["main"], IndexDescriptor::default());
        assert_eq!(parsed["extra"], IndexDescriptor::new().priority(3));
    }

    #[test]
    fn test_parse_rejects_unknown_key() {
        let err = parse_index_descriptions("[main]\nurl = \"x\"\n").unwrap_err();
        match err {
            Error::InvalidIndexDescription { name, reason } => {
                assert_eq!(name, "main");
                assert!(reason.contains("unknown field"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        let err = parse_index_descriptions("[main]\npriority = \"high\"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidIndexDescription { ref name, .. } if name == "main"));
    }

    #[test]
    fn test_parse_rejects_non_table() {
        let err = parse_index_descriptions("main = 3\n").unwrap_err();
        assert!(err.to_string().contains("description must be a table"));
    }

    #[rstest]
    #[case("my_index", true)]
    #[case("index-2", true)]
    #[case("", false)]
    #[case("  ", false)]
    #[case("a/b", false)]
    #[case("a\\b", false)]
    #[case(".", false)]
    #[case("..", false)]
    fn test_validate_index_name(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(validate_index_name(name).is_ok(), valid, "{name:?}");
    }
}
