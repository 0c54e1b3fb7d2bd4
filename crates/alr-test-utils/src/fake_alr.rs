//! A scripted stand-in for the `alr` executable.
//!
//! The script records every invocation and imitates just enough of `alr`
//! for the driver's own tests:
//!
//! - `init <name> --bin|--lib` creates `<name>/alire.toml` and `<name>/alire.lock`
//! - `pin` and `with` rewrite `alire.lock` in the working directory, as a
//!   re-solve would
//! - `config ... --set <key> <value>` appends to `$ALR_CONFIG/settings.toml`
//! - `version` prints a report (first line CRLF-terminated)
//!
//! `FAKE_ALR_FAIL_ON=<verb>` makes that verb exit with status 1,
//! `FAKE_ALR_WARN=<text>` writes a warning to stderr before any other output,
//! and `FAKE_ALR_DISTRO` overrides the reported distribution.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
log="$(dirname "$0")/calls.log"
{
    printf '%s\t%s' "$PWD" "${ALR_CONFIG:-}"
    for arg in "$@"; do
        printf '\t%s' "$arg"
    done
    printf '\n'
} >> "$log"

while [ $# -gt 0 ]; do
    case "$1" in
        -*) shift ;;
        *) break ;;
    esac
done

verb="${1:-}"
if [ $# -gt 0 ]; then
    shift
fi

if [ -n "${FAKE_ALR_FAIL_ON:-}" ] && [ "$verb" = "$FAKE_ALR_FAIL_ON" ]; then
    echo "error: $verb failed on request" >&2
    exit 1
fi

if [ -n "${FAKE_ALR_WARN:-}" ]; then
    echo "warning: $FAKE_ALR_WARN" >&2
fi

case "$verb" in
    version)
        printf 'alr version (from build):       2.0.0-fake\r\n'
        printf 'community index branch:         stable-1.4.0\n'
        printf 'platform properties:\n'
        printf '  distribution:                 %s\n' "${FAKE_ALR_DISTRO:-ubuntu}"
        ;;
    init)
        name="$1"
        mkdir -p "$name"
        {
            printf 'name = "%s"\n' "$name"
            printf 'description = "Shiny new project"\n'
            printf 'version = "0.1.0-dev"\n'
            printf '\n'
            printf 'authors = ["Alice"]\n'
            printf 'maintainers = ["Alice <alice@example.com>"]\n'
            printf 'maintainers-logins = ["alice"]\n'
            if [ "${2:-}" = "--bin" ]; then
                printf 'executables = ["%s"]\n' "$name"
            fi
        } > "$name/alire.toml"
        printf '# solved by fake alr\n' > "$name/alire.lock"
        ;;
    pin|with)
        if [ -f alire.toml ]; then
            printf '# solved by fake alr\n' > alire.lock
        fi
        ;;
    config)
        if [ -n "${ALR_CONFIG:-}" ]; then
            while [ $# -gt 0 ]; do
                if [ "$1" = "--set" ]; then
                    printf '%s = %s\n' "$2" "$3" >> "$ALR_CONFIG/settings.toml"
                    shift 2
                fi
                shift
            done
        fi
        ;;
esac
exit 0
"#;

/// One recorded invocation of the fake executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Working directory of the process
    pub cwd: PathBuf,
    /// Value of `ALR_CONFIG`, empty when unset
    pub config: String,
    /// Arguments, flags included
    pub args: Vec<String>,
}

impl Call {
    /// Arguments after the leading flags (`-n`, `-d`, ...).
    pub fn command(&self) -> Vec<&str> {
        self.args
            .iter()
            .skip_while(|a| a.starts_with('-'))
            .map(String::as_str)
            .collect()
    }

    /// The leading flags.
    pub fn flags(&self) -> Vec<&str> {
        self.args
            .iter()
            .take_while(|a| a.starts_with('-'))
            .map(String::as_str)
            .collect()
    }
}

/// An installed fake `alr` living in its own temporary directory.
///
/// # Example
///
/// ```rust,no_run
/// use alr_test_utils::FakeAlr;
///
/// let alr = FakeAlr::install();
/// // hand `alr.program()` to the code under test, then:
/// assert!(alr.calls().is_empty());
/// ```
pub struct FakeAlr {
    dir: TempDir,
    program: PathBuf,
}

impl FakeAlr {
    /// Write the script and make it executable.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn install() -> Self {
        let dir = TempDir::new().expect("FakeAlr::install: failed to create temp dir");
        let program = dir.path().join("alr");
        fs::write(&program, SCRIPT)
            .unwrap_or_else(|e| panic!("FakeAlr::install: failed to write script: {e}"));
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755))
            .unwrap_or_else(|e| panic!("FakeAlr::install: failed to chmod script: {e}"));
        Self { dir, program }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("calls.log")
    }

    /// Every invocation so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        let Ok(log) = fs::read_to_string(self.log_path()) else {
            return Vec::new();
        };
        log.lines()
            .map(|line| {
                let mut fields = line.split('\t');
                let cwd = PathBuf::from(fields.next().unwrap_or_default());
                let config = fields.next().unwrap_or_default().to_string();
                let args = fields.map(str::to_string).collect();
                Call { cwd, config, args }
            })
            .collect()
    }

    /// Commands (flags stripped) of every invocation, joined with spaces.
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.command().join(" ")).collect()
    }

    /// Forget recorded invocations.
    pub fn clear(&self) {
        let _ = fs::remove_file(self.log_path());
    }
}
