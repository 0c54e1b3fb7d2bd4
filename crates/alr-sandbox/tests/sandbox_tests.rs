use alr_sandbox::{Error, Fixtures, IndexDescriptor, prepare_indexes};
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

/// A fixtures tree with one index and a `crates` source directory
fn fixtures_tree() -> assert_fs::TempDir {
    let fixtures = assert_fs::TempDir::new().unwrap();
    fixtures
        .child("basic_index/index/li/libfoo/libfoo-1.0.0.toml")
        .write_str("name = \"libfoo\"\n")
        .unwrap();
    fixtures
        .child("crates/libfoo/alire.toml")
        .write_str("name = \"libfoo\"\n")
        .unwrap();
    fixtures
}

fn read_index(config: &assert_fs::TempDir, name: &str) -> toml::Table {
    let path = config.child(format!("indexes/{name}/index.toml"));
    toml::from_str(&std::fs::read_to_string(path.path()).unwrap()).unwrap()
}

#[test]
fn test_index_defaults_resolve_under_fixtures() {
    let fixtures = fixtures_tree();
    let config = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();

    let descriptions = BTreeMap::from([("basic_index".to_string(), IndexDescriptor::default())]);
    prepare_indexes(
        config.path(),
        work.path(),
        &Fixtures::new(fixtures.path()),
        &descriptions,
    )
    .unwrap();

    let index = read_index(&config, "basic_index");
    assert_eq!(index["name"].as_str(), Some("basic_index"));
    assert_eq!(index["priority"].as_integer(), Some(1));
    assert_eq!(
        index["url"].as_str().map(std::path::PathBuf::from),
        Some(fixtures.path().join("basic_index"))
    );
    // No sources copied unless asked
    work.child("crates").assert(predicate::path::missing());
}

#[test]
fn test_index_in_working_dir_with_priority() {
    let fixtures = fixtures_tree();
    let config = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();
    work.child("my_index/index/.keep").touch().unwrap();

    let descriptions = BTreeMap::from([(
        "local".to_string(),
        IndexDescriptor::new()
            .dir("my_index")
            .in_fixtures(false)
            .priority(2),
    )]);
    prepare_indexes(
        config.path(),
        work.path(),
        &Fixtures::new(fixtures.path()),
        &descriptions,
    )
    .unwrap();

    let index = read_index(&config, "local");
    assert_eq!(index["priority"].as_integer(), Some(2));
    assert_eq!(
        index["url"].as_str().map(std::path::PathBuf::from),
        Some(work.path().join("my_index"))
    );
}

#[test]
fn test_copy_crates_src_lands_outside_index() {
    let fixtures = fixtures_tree();
    let config = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();

    let descriptions = BTreeMap::from([(
        "basic_index".to_string(),
        IndexDescriptor::new().copy_crates_src(true),
    )]);
    prepare_indexes(
        config.path(),
        work.path(),
        &Fixtures::new(fixtures.path()),
        &descriptions,
    )
    .unwrap();

    work.child("crates/libfoo/alire.toml")
        .assert(predicate::str::contains("libfoo"));
    fixtures
        .child("basic_index/crates")
        .assert(predicate::path::missing());
}

#[test]
fn test_several_indexes() {
    let fixtures = fixtures_tree();
    let config = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();

    let descriptions = alr_sandbox::parse_index_descriptions(
        "[first]\ndir = \"basic_index\"\n\n[second]\ndir = \"basic_index\"\npriority = 5\n",
    )
    .unwrap();
    prepare_indexes(
        config.path(),
        work.path(),
        &Fixtures::new(fixtures.path()),
        &descriptions,
    )
    .unwrap();

    assert_eq!(read_index(&config, "first")["priority"].as_integer(), Some(1));
    assert_eq!(read_index(&config, "second")["priority"].as_integer(), Some(5));
}

#[test]
fn test_invalid_name_writes_nothing_for_that_index() {
    let fixtures = fixtures_tree();
    let config = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();

    let descriptions = BTreeMap::from([(
        "../escape".to_string(),
        IndexDescriptor::new().copy_crates_src(true),
    )]);
    let err = prepare_indexes(
        config.path(),
        work.path(),
        &Fixtures::new(fixtures.path()),
        &descriptions,
    )
    .unwrap_err();

    assert!(matches!(err, Error::InvalidIndexDescription { .. }));
    work.child("crates").assert(predicate::path::missing());
    config.child("escape").assert(predicate::path::missing());
}

#[test]
fn test_empty_dir_is_rejected() {
    let fixtures = fixtures_tree();
    let config = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();

    let descriptions = BTreeMap::from([("main".to_string(), IndexDescriptor::new().dir(""))]);
    let err = prepare_indexes(
        config.path(),
        work.path(),
        &Fixtures::new(fixtures.path()),
        &descriptions,
    )
    .unwrap_err();

    assert!(err.to_string().contains("invalid index description for main"));
    config
        .child("indexes/main")
        .assert(predicate::path::missing());
}

#[test]
fn test_relative_fixtures_root_resolves_against_current_dir() {
    // Tests run from the crate directory; the shared fixtures sit at the
    // workspace root.
    let relative = std::path::Path::new("../../test-fixtures");
    let expected_root = std::env::current_dir().unwrap().join(relative);
    let config = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();

    let descriptions = BTreeMap::from([(
        "basic_index".to_string(),
        IndexDescriptor::new().copy_crates_src(true),
    )]);
    prepare_indexes(
        config.path(),
        work.path(),
        &Fixtures::new(relative),
        &descriptions,
    )
    .unwrap();

    let url = read_index(&config, "basic_index")["url"]
        .as_str()
        .map(std::path::PathBuf::from)
        .unwrap();
    assert_eq!(url, expected_root.join("basic_index"));
    assert!(!url.starts_with(work.path()));
    work.child("crates/libfoo/alire.toml")
        .assert(predicate::str::contains("name = \"libfoo\""));
}

#[test]
fn test_default_config_index_stays_out_of_working_dir() {
    let config = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();

    let descriptions = BTreeMap::from([("basic_index".to_string(), IndexDescriptor::default())]);
    prepare_indexes(
        config.path(),
        work.path(),
        &alr_sandbox::DriverConfig::default().fixtures(),
        &descriptions,
    )
    .unwrap();

    let url = read_index(&config, "basic_index")["url"]
        .as_str()
        .map(std::path::PathBuf::from)
        .unwrap();
    assert_eq!(
        url,
        std::env::current_dir().unwrap().join("fixtures/basic_index")
    );
}
