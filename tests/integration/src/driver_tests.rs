//! End-to-end driver flow against the scripted `alr`
//!
//! Stages a configuration directory and an index from `test-fixtures/`,
//! creates a crate and edits its manifest the way test cases do.
#![cfg(unix)]

use std::path::{Path, PathBuf};

use alr_manifest::{
    CrateKind, CrateRoot, DEPENDS_ON, DependencyRequest, EditOptions, EntryValue, PINS, PinTarget,
};
use alr_process::env::DISABLE_DISTRO_VAR;
use alr_process::{Invoker, RunOptions, version_report};
use alr_sandbox::config::{EXECUTABLE_VAR, FIXTURES_VAR};
use alr_sandbox::{DriverConfig, parse_index_descriptions, prepare_env, prepare_indexes};
use alr_test_utils::FakeAlr;
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

fn driver_config(alr: &FakeAlr) -> DriverConfig {
    let program = alr.program().to_string_lossy().into_owned();
    let fixtures = fixtures_root().to_string_lossy().into_owned();
    DriverConfig::default().with_overrides(|key| match key {
        EXECUTABLE_VAR => Some(program.clone()),
        FIXTURES_VAR => Some(fixtures.clone()),
        _ => None,
    })
}

/// A staged test case: configuration dir, working dir and invoker
struct Sandbox {
    config_dir: PathBuf,
    work: assert_fs::TempDir,
    invoker: Invoker,
    _config: assert_fs::TempDir,
}

fn stage(alr: &FakeAlr, disable_distro: bool) -> Sandbox {
    alr_test_utils::logging::init();
    let config = driver_config(alr);
    let config_root = assert_fs::TempDir::new().unwrap();
    let work = assert_fs::TempDir::new().unwrap();

    let mut invoker = config.invoker();
    invoker.env_mut().remove("FAKE_ALR_FAIL_ON");
    if disable_distro {
        invoker.env_mut().set(DISABLE_DISTRO_VAR, "true");
    } else {
        invoker.env_mut().remove(DISABLE_DISTRO_VAR);
    }

    let config_dir = prepare_env(
        &config_root.path().join("alr-config"),
        &mut invoker,
        RunOptions::default(),
    )
    .unwrap();

    let descriptions = parse_index_descriptions("[basic_index]\ncopy_crates_src = true\n").unwrap();
    prepare_indexes(&config_dir, work.path(), &config.fixtures(), &descriptions).unwrap();

    Sandbox {
        config_dir,
        work,
        invoker,
        _config: config_root,
    }
}

#[test]
fn test_staged_case_adds_dependency() {
    let alr = FakeAlr::install();
    let sandbox = stage(&alr, true);

    let root = CrateRoot::init(&sandbox.invoker, sandbox.work.path(), "xxx", CrateKind::Binary)
        .unwrap();
    root.with_dependency(&DependencyRequest::add("libfoo"))
        .unwrap();

    let manifest = std::fs::read_to_string(root.manifest_path()).unwrap();
    assert!(manifest.ends_with("\n[[depends-on]]\nlibfoo = \"*\"\n"), "{manifest}");
    assert_eq!(
        alr.commands(),
        vec![
            "config --global --set distribution.disable_detection true",
            "init xxx --bin",
            "with",
        ]
    );

    let config = sandbox.config_dir.to_string_lossy();
    assert!(alr.calls().iter().all(|call| call.config == config));
}

#[test]
fn test_index_and_sources_are_staged() {
    let alr = FakeAlr::install();
    let sandbox = stage(&alr, false);

    let index = std::fs::read_to_string(sandbox.config_dir.join("indexes/basic_index/index.toml"))
        .unwrap();
    assert!(index.contains("name = \"basic_index\""));
    assert!(index.contains("priority = 1"));
    assert!(index.contains("basic_index\""));

    sandbox
        .work
        .child("crates/libfoo/alire.toml")
        .assert(predicate::str::contains("name = \"libfoo\""));
    // Without the toggle nothing is bootstrapped
    assert!(alr.calls().is_empty());
}

#[test]
fn test_pin_and_unpin_round_trip() {
    let alr = FakeAlr::install();
    let sandbox = stage(&alr, false);
    let root = CrateRoot::init(&sandbox.invoker, sandbox.work.path(), "xxx", CrateKind::Binary)
        .unwrap();
    root.with_dependency(&DependencyRequest::add("libfoo"))
        .unwrap();
    let before = std::fs::read_to_string(root.manifest_path()).unwrap();

    root.pin("libfoo", &PinTarget::path("../crates/libfoo"), EditOptions::default())
        .unwrap();
    let doc = root.manifest().unwrap();
    assert_eq!(
        doc.find(PINS, "libfoo").unwrap().value().unwrap(),
        EntryValue::Source(PinTarget::path("../crates/libfoo"))
    );
    assert!(doc.contains(DEPENDS_ON, "libfoo"));

    assert!(root.unpin("libfoo", EditOptions::default(), true).unwrap());
    assert_eq!(std::fs::read_to_string(root.manifest_path()).unwrap(), before);
    assert_eq!(alr.commands(), vec!["init xxx --bin", "with", "pin", "pin"]);
}

#[test]
fn test_library_crate_with_delegated_edits() {
    let alr = FakeAlr::install();
    let sandbox = stage(&alr, false);
    let root = CrateRoot::init(&sandbox.invoker, sandbox.work.path(), "yyy", CrateKind::Library)
        .unwrap();
    alr.clear();

    root.with_dependency(&DependencyRequest::add("libfoo^1").manual(false))
        .unwrap();
    root.pin(
        "libfoo",
        &PinTarget::path("../crates/libfoo"),
        EditOptions::new().manual(false),
    )
    .unwrap();

    assert_eq!(
        alr.commands(),
        vec!["with libfoo^1", "pin libfoo --use ../crates/libfoo"]
    );
    let manifest = std::fs::read_to_string(root.manifest_path()).unwrap();
    assert!(!manifest.contains("executables"));
}

#[test]
fn test_version_report_through_staged_invoker() {
    let alr = FakeAlr::install();
    let sandbox = stage(&alr, false);

    let report = version_report(&sandbox.invoker).unwrap();
    assert!(report.distro_is_known());
    assert_eq!(report.index_branch().unwrap(), "stable-1.4.0");
    assert_eq!(report.index_version().unwrap(), "1.4.0");

    let mut unknown = sandbox.invoker.clone();
    unknown.env_mut().set("FAKE_ALR_DISTRO", "DISTRO_UNKNOWN");
    assert!(!version_report(&unknown).unwrap().distro_is_known());
}
