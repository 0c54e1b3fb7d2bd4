//! Edits applied to one crate directory
//!
//! Every operation comes in two flavours. Manual edits rewrite `alire.toml`
//! directly, age the lockfile and optionally let `alr` reconcile. Delegated
//! edits issue the equivalent `alr` command, which always reconciles.

use std::path::{Path, PathBuf};

use alr_fs::AlrPath;
use alr_process::{Invoker, RunOptions};

use crate::document::{DEPENDS_ON, ManifestDocument, PINS};
use crate::error::{Error, Result};
use crate::source::{Dependency, PinTarget, SourceOptions, validate_crate_name};

/// Kind of crate created by `alr init`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrateKind {
    Binary,
    Library,
}

impl CrateKind {
    pub fn flag(self) -> &'static str {
        match self {
            Self::Binary => "--bin",
            Self::Library => "--lib",
        }
    }
}

/// How a pin or unpin is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOptions {
    /// Edit the manifest directly instead of calling `alr`
    pub manual: bool,
    /// Let `alr` recompute the solution afterwards
    pub reconcile: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            manual: true,
            reconcile: true,
        }
    }
}

impl EditOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manual(mut self, manual: bool) -> Self {
        self.manual = manual;
        self
    }

    pub fn reconcile(mut self, reconcile: bool) -> Self {
        self.reconcile = reconcile;
        self
    }

    fn require_reconcile(&self, operation: &str) -> Result<()> {
        if self.reconcile {
            Ok(())
        } else {
            Err(Error::UpdateRequired {
                operation: operation.to_string(),
            })
        }
    }
}

/// Arguments of [`CrateRoot::with_dependency`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRequest {
    /// Dependency expression such as `libfoo` or `libfoo^1.0`
    pub dep: Option<String>,
    pub path: Option<String>,
    pub url: Option<String>,
    pub commit: Option<String>,
    pub branch: Option<String>,
    /// Remove the dependency instead of adding it
    pub delete: bool,
    pub manual: bool,
    pub reconcile: bool,
    /// Pass `-f` to the reconciling call
    pub force: bool,
}

impl Default for DependencyRequest {
    fn default() -> Self {
        Self {
            dep: None,
            path: None,
            url: None,
            commit: None,
            branch: None,
            delete: false,
            manual: true,
            reconcile: true,
            force: false,
        }
    }
}

impl DependencyRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a request adding `dep`.
    pub fn add(dep: impl Into<String>) -> Self {
        Self::new().dep(dep)
    }

    /// Shorthand for a request removing `dep`.
    pub fn remove(dep: impl Into<String>) -> Self {
        Self::new().dep(dep).delete(true)
    }

    pub fn dep(mut self, dep: impl Into<String>) -> Self {
        self.dep = Some(dep.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    pub fn manual(mut self, manual: bool) -> Self {
        self.manual = manual;
        self
    }

    pub fn reconcile(mut self, reconcile: bool) -> Self {
        self.reconcile = reconcile;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    fn validate(&self) -> Result<()> {
        let given = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if given(&self.commit) && given(&self.branch) {
            return Err(Error::conflict("Do not specify both commit and branch"));
        }
        if given(&self.path) && given(&self.url) {
            return Err(Error::conflict("Do not specify both path and url"));
        }
        if self.manual && !given(&self.dep) {
            return Err(Error::invalid(
                "dependency",
                "Cannot manually add without explicit dependency",
            ));
        }
        Ok(())
    }

    /// Pin override accompanying a manual addition, if any.
    fn pin_override(&self) -> Result<Option<PinTarget>> {
        let given = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if !given(&self.path) && !given(&self.url) {
            return Ok(None);
        }
        SourceOptions {
            version: None,
            path: self.path.clone(),
            url: self.url.clone(),
            commit: self.commit.clone(),
            branch: self.branch.clone(),
        }
        .resolve()
        .map(Some)
    }

    fn cli_args(&self) -> Vec<String> {
        let dep = self.dep.clone().filter(|d| !d.is_empty());
        let mut args = vec!["with".to_string()];
        if self.delete {
            args.push("--del".to_string());
            args.extend(dep);
            return args;
        }
        args.extend(dep);

        let set = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        if let Some(source) = set(&self.path).or_else(|| set(&self.url)) {
            args.extend(["--use".to_string(), source]);
        }
        if let Some(commit) = set(&self.commit) {
            args.extend(["--commit".to_string(), commit]);
        } else if let Some(branch) = set(&self.branch) {
            args.extend(["--branch".to_string(), branch]);
        }
        args
    }
}

/// A crate directory holding `alire.toml` and `alire.lock`
#[derive(Debug, Clone)]
pub struct CrateRoot {
    root: PathBuf,
    invoker: Invoker,
}

impl CrateRoot {
    /// Bind `root` to a copy of `invoker` running inside it.
    pub fn new(root: impl Into<PathBuf>, invoker: &Invoker) -> Self {
        let root = root.into();
        let invoker = invoker.in_dir(&root);
        Self { root, invoker }
    }

    /// Run `alr init` in `parent` and return the new crate.
    pub fn init(invoker: &Invoker, parent: &Path, name: &str, kind: CrateKind) -> Result<Self> {
        validate_crate_name(name)?;
        invoker
            .in_dir(parent)
            .run(&["init", name, kind.flag()], RunOptions::default())?;

        let root = parent.join(name);
        tracing::info!(root = %root.display(), ?kind, "Initialized crate");
        Ok(Self::new(root, invoker))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(AlrPath::Manifest)
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.root.join(AlrPath::Lockfile)
    }

    /// Parse the current manifest.
    pub fn manifest(&self) -> Result<ManifestDocument> {
        let content = alr_fs::read_text(&self.manifest_path())?;
        Ok(ManifestDocument::parse(&content))
    }

    /// Age the lockfile so `alr` treats the manifest as newer.
    ///
    /// Returns `false` when there is no lockfile yet.
    pub fn touch_manifest(&self) -> Result<bool> {
        Ok(alr_fs::make_stale(&self.lockfile_path())?)
    }

    /// Remove the `key` entry from `[[array]]`.
    ///
    /// A missing entry is an [`Error::EntryNotFound`] when `fail_if_missing`,
    /// otherwise a no-op leaving manifest and lockfile alone. Returns whether
    /// the manifest changed.
    pub fn remove_entry(
        &self,
        array: &str,
        key: &str,
        fail_if_missing: bool,
        reconcile: bool,
    ) -> Result<bool> {
        let content = alr_fs::read_text(&self.manifest_path())?;
        let mut doc = ManifestDocument::parse(&content);

        if !doc.remove(array, key) {
            if fail_if_missing {
                return Err(Error::EntryNotFound {
                    array: array.to_string(),
                    crate_name: key.to_string(),
                    manifest: content,
                });
            }
            tracing::debug!(array, key, "Nothing to remove");
            return Ok(false);
        }

        self.save(&doc)?;
        tracing::debug!(array, key, "Removed manifest entry");
        if reconcile {
            self.reconcile("pin", false)?;
        }
        Ok(true)
    }

    /// Append `key = value` in a new `[[array]]` section.
    ///
    /// `value` is written verbatim and must already be valid TOML. Adding
    /// the same entry twice produces two sections.
    pub fn add_entry(&self, array: &str, key: &str, value: &str) -> Result<()> {
        let mut doc = self.manifest()?;
        doc.append(array, key, value);
        self.save(&doc)?;
        tracing::debug!(array, key, value, "Appended manifest entry");
        Ok(())
    }

    /// Pin `crate_name` to `target`, replacing any existing pin.
    pub fn pin(&self, crate_name: &str, target: &PinTarget, options: EditOptions) -> Result<()> {
        validate_crate_name(crate_name)?;
        target.validate()?;

        if !options.manual {
            options.require_reconcile("pin")?;
            let mut args = vec!["pin".to_string()];
            args.extend(target.cli_args(crate_name));
            self.invoker.run(&args, RunOptions::default())?;
            return Ok(());
        }

        let mut doc = self.manifest()?;
        doc.remove(PINS, crate_name);
        doc.append(PINS, crate_name, &target.inline());
        self.save(&doc)?;
        tracing::info!(crate_name, %target, "Pinned crate");

        if options.reconcile {
            self.reconcile("pin", false)?;
        }
        Ok(())
    }

    /// Like [`pin`](Self::pin), from loosely specified options.
    pub fn pin_with(
        &self,
        crate_name: &str,
        source: SourceOptions,
        options: EditOptions,
    ) -> Result<()> {
        let target = source.resolve()?;
        self.pin(crate_name, &target, options)
    }

    /// Drop the pin of `crate_name`. Returns whether a pin was removed.
    pub fn unpin(
        &self,
        crate_name: &str,
        options: EditOptions,
        fail_if_missing: bool,
    ) -> Result<bool> {
        if options.manual {
            return self.remove_entry(PINS, crate_name, fail_if_missing, options.reconcile);
        }

        options.require_reconcile("unpin")?;
        self.invoker
            .run(&["pin", "--unpin", crate_name], RunOptions::default())?;
        Ok(true)
    }

    /// Add or remove a dependency.
    pub fn with_dependency(&self, request: &DependencyRequest) -> Result<()> {
        request.validate()?;

        if !request.manual {
            if !request.reconcile {
                return Err(Error::UpdateRequired {
                    operation: "with".to_string(),
                });
            }
            let options = RunOptions::default().force(request.force && !request.delete);
            self.invoker.run(&request.cli_args(), options)?;
            return Ok(());
        }

        let dep = Dependency::parse(request.dep.as_deref().unwrap_or_default())?;
        if request.delete {
            self.remove_entry(DEPENDS_ON, &dep.name, true, request.reconcile)?;
            return Ok(());
        }

        let pin = request.pin_override()?;
        let mut doc = self.manifest()?;
        doc.append(DEPENDS_ON, &dep.name, &dep.entry_value());
        if let Some(target) = &pin {
            doc.remove(PINS, &dep.name);
            doc.append(PINS, &dep.name, &target.inline());
        }
        self.save(&doc)?;
        tracing::info!(dependency = %dep, pinned = pin.is_some(), "Added dependency");

        if request.reconcile {
            self.reconcile("with", request.force)?;
        }
        Ok(())
    }

    /// Write the manifest and age the lockfile.
    fn save(&self, doc: &ManifestDocument) -> Result<()> {
        alr_fs::write_text(&self.manifest_path(), &doc.render())?;
        if !self.touch_manifest()? {
            tracing::debug!(root = %self.root.display(), "Lockfile missing, not aged");
        }
        Ok(())
    }

    fn reconcile(&self, verb: &str, force: bool) -> Result<()> {
        self.invoker
            .run(&[verb], RunOptions::default().force(force))?;
        Ok(())
    }
}
