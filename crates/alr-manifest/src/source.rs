//! Pin targets and dependency expressions

use std::fmt;

use toml_edit::{InlineTable, Value};

use crate::error::{Error, Result};

/// Characters that start a version constraint in a dependency expression.
///
/// [`Dependency::parse`] splits at the first of these, not the right-most
/// one, so `libfoo>=1.0` keeps its `>=` operator whole.
pub const VERSION_OPERATORS: [char; 6] = ['=', '^', '~', '<', '>', '*'];

/// Git reference accompanying a url pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRef {
    Commit(String),
    Branch(String),
}

/// What a pinned crate resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinTarget {
    /// An exact version from the index
    Version(String),
    /// A local directory
    Path(String),
    /// A remote repository, optionally at a commit or branch
    Url {
        url: String,
        reference: Option<GitRef>,
    },
}

impl PinTarget {
    pub fn version(version: impl Into<String>) -> Self {
        Self::Version(version.into())
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url {
            url: url.into(),
            reference: None,
        }
    }

    pub fn url_at_commit(url: impl Into<String>, commit: impl Into<String>) -> Self {
        Self::Url {
            url: url.into(),
            reference: Some(GitRef::Commit(commit.into())),
        }
    }

    pub fn url_at_branch(url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self::Url {
            url: url.into(),
            reference: Some(GitRef::Branch(branch.into())),
        }
    }

    /// Inline-table syntax as written to the manifest.
    ///
    /// Paths, urls and git references use literal strings so Windows
    /// backslashes need no escaping.
    pub fn inline(&self) -> String {
        match self {
            Self::Version(v) => format!("{{ version = {} }}", basic_string(v)),
            Self::Path(p) => format!("{{ path = '{p}' }}"),
            Self::Url {
                url,
                reference: None,
            } => format!("{{ url = '{url}' }}"),
            Self::Url {
                url,
                reference: Some(GitRef::Commit(commit)),
            } => format!("{{ url = '{url}', commit = '{commit}' }}"),
            Self::Url {
                url,
                reference: Some(GitRef::Branch(branch)),
            } => format!("{{ url = '{url}', branch = '{branch}' }}"),
        }
    }

    /// Arguments of `alr pin` producing the same pin.
    pub fn cli_args(&self, crate_name: &str) -> Vec<String> {
        match self {
            Self::Version(v) => vec![format!("{crate_name}={v}")],
            Self::Path(p) => vec![crate_name.to_string(), "--use".to_string(), p.clone()],
            Self::Url { url, reference } => {
                let mut args = vec![crate_name.to_string(), "--use".to_string(), url.clone()];
                match reference {
                    Some(GitRef::Commit(c)) => args.extend(["--commit".to_string(), c.clone()]),
                    Some(GitRef::Branch(b)) => args.extend(["--branch".to_string(), b.clone()]),
                    None => {}
                }
                args
            }
        }
    }

    /// Read a pin back from its inline table.
    pub fn from_inline(table: &InlineTable) -> Result<Self> {
        let field = |key: &str| table.get(key).and_then(Value::as_str).map(str::to_string);
        SourceOptions {
            version: field("version"),
            path: field("path"),
            url: field("url"),
            commit: field("commit"),
            branch: field("branch"),
        }
        .resolve()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Version(v) => single_line("version", v),
            Self::Path(p) => literal("path", p),
            Self::Url { url, reference } => {
                literal("url", url)?;
                match reference {
                    Some(GitRef::Commit(c)) => literal("commit", c),
                    Some(GitRef::Branch(b)) => literal("branch", b),
                    None => Ok(()),
                }
            }
        }
    }
}

impl fmt::Display for PinTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inline())
    }
}

/// Loose description of a pin source, validated into a [`PinTarget`].
///
/// Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    pub version: Option<String>,
    pub path: Option<String>,
    pub url: Option<String>,
    pub commit: Option<String>,
    pub branch: Option<String>,
}

impl SourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
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

    /// Check mutual exclusion and build the target.
    pub fn resolve(self) -> Result<PinTarget> {
        let set = |v: Option<String>| v.filter(|s| !s.is_empty());
        let version = set(self.version);
        let path = set(self.path);
        let url = set(self.url);
        let commit = set(self.commit);
        let branch = set(self.branch);

        if commit.is_some() && branch.is_some() {
            return Err(Error::conflict("Do not specify both commit and branch"));
        }
        let sources = [&version, &path, &url]
            .iter()
            .filter(|s| s.is_some())
            .count();
        if sources > 1 {
            return Err(Error::conflict("Specify only one of version, path or url"));
        }
        if url.is_none() && (commit.is_some() || branch.is_some()) {
            return Err(Error::conflict("A commit or branch can only accompany a url"));
        }

        let target = match (version, path, url) {
            (Some(v), _, _) => PinTarget::Version(v),
            (_, Some(p), _) => PinTarget::Path(p),
            (_, _, Some(url)) => PinTarget::Url {
                url,
                reference: commit
                    .map(GitRef::Commit)
                    .or(branch.map(GitRef::Branch)),
            },
            (None, None, None) => {
                return Err(Error::invalid("pin", "Specify either version, path or url"));
            }
        };
        target.validate()?;
        Ok(target)
    }
}

/// A dependency expression split into crate name and version constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub constraint: String,
}

impl Dependency {
    /// Split `dep` at its version operator.
    ///
    /// A bare crate name gets the `*` constraint. Crate names cannot contain
    /// operator characters, so the constraint starts at the first one; this
    /// keeps compound operators such as `>=` intact.
    pub fn parse(dep: &str) -> Result<Self> {
        let dep = dep.trim();
        let (name, constraint) = match dep.find(VERSION_OPERATORS) {
            Some(pos) => (dep[..pos].trim(), dep[pos..].trim()),
            None => (dep, "*"),
        };
        validate_crate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            constraint: constraint.to_string(),
        })
    }

    /// Value written after `name =` in `[[depends-on]]`.
    pub fn entry_value(&self) -> String {
        basic_string(&self.constraint)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.constraint)
    }
}

/// Crate names double as bare TOML keys.
pub(crate) fn validate_crate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid("crate name", "must not be empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::invalid(
            "crate name",
            format!("'{name}' may only contain letters, digits, '_' and '-'"),
        ));
    }
    Ok(())
}

/// A TOML basic string.
pub(crate) fn basic_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn single_line(what: &str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(Error::invalid(what, "must be a single line"));
    }
    Ok(())
}

/// TOML literal strings cannot hold a single quote or a line break.
fn literal(what: &str, value: &str) -> Result<()> {
    single_line(what, value)?;
    if value.contains('\'') {
        return Err(Error::invalid(what, format!("'{value}' contains a single quote")));
    }
    Ok(())
}
