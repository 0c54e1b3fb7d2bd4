//! Blocking `alr` invocations with normalized flags and output

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::env::Environment;
use crate::error::{Error, Result};

/// Per-invocation switches.
///
/// Defaults match what test cases want almost always: fail on a non-zero
/// exit, raw diagnostics on, quiet on, force off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Turn a non-zero exit status into [`Error::InvocationFailed`].
    pub complain_on_error: bool,
    /// Pass `-d` so internal errors are logged instead of sanitized.
    pub debug: bool,
    /// Pass `-f`.
    pub force: bool,
    /// Pass `-q`.
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            complain_on_error: true,
            debug: true,
            force: false,
            quiet: true,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complain_on_error(mut self, complain: bool) -> Self {
        self.complain_on_error = complain;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Exit status and captured output of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code, or -1 when the process was terminated by a signal
    pub status: i32,
    /// stdout followed by stderr, with CRLF rewritten to LF.
    ///
    /// The two streams are captured separately and concatenated, so a line
    /// written to stderr always appears after all of stdout, whatever order
    /// the tool emitted them in. Assertions on mixed output must allow for it.
    pub output: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs `alr` with a fixed program path, environment and working directory
#[derive(Debug, Clone)]
pub struct Invoker {
    program: PathBuf,
    current_dir: Option<PathBuf>,
    env: Environment,
}

impl Invoker {
    /// Create an invoker for `program`, inheriting the working directory of
    /// the test process and no environment overrides.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            current_dir: None,
            env: Environment::new(),
        }
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Derive an invoker that runs inside `dir`.
    pub fn in_dir(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: Some(dir.into()),
            ..self.clone()
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Full argument vector, program first, for `args` under `options`.
    pub fn argv<S: AsRef<str>>(&self, args: &[S], options: &RunOptions) -> Vec<String> {
        let mut argv = vec![self.program.to_string_lossy().into_owned()];
        argv.push("-n".to_string());
        if options.debug {
            argv.push("-d".to_string());
        }
        if options.force {
            argv.push("-f".to_string());
        }
        if options.quiet {
            argv.push("-q".to_string());
        }
        argv.extend(args.iter().map(|a| a.as_ref().to_string()));
        argv
    }

    /// Run `alr` once and wait for it.
    ///
    /// There is no retry and no timeout: a hanging tool hangs the caller.
    pub fn run<S: AsRef<str>>(&self, args: &[S], options: RunOptions) -> Result<ProcessResult> {
        let argv = self.argv(args, &options);
        let command_line = quote_command(&argv);

        let mut cmd = Command::new(&self.program);
        cmd.args(&argv[1..]).stdin(Stdio::null());
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        self.env.apply(&mut cmd);

        tracing::debug!(
            command = %command_line,
            dir = ?self.current_dir,
            "Running alr"
        );

        let output = cmd.output().map_err(|source| Error::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let mut raw = String::from_utf8_lossy(&output.stdout).into_owned();
        raw.push_str(&String::from_utf8_lossy(&output.stderr));
        let result = ProcessResult {
            status: output.status.code().unwrap_or(-1),
            output: normalize_newlines(&raw),
        };

        if !result.success() && options.complain_on_error {
            tracing::error!(
                command = %command_line,
                status = result.status,
                output = %result.output,
                "alr returned non-zero status code"
            );
            return Err(Error::InvocationFailed {
                command: command_line,
                status: result.status,
                output: result.output,
            });
        }

        Ok(result)
    }
}

/// Rewrite CRLF line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Join an argument vector into a command line a POSIX shell would accept.
pub fn quote_command<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .map(|a| quote_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> Cow<'_, str> {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
    if safe {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}
