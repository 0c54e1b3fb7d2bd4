//! Isolated configuration directory for `alr`

use std::path::{Path, PathBuf};

use alr_process::env::CONFIG_VAR;
use alr_process::{Invoker, RunOptions};

use crate::Result;

/// Prepare `invoker` to run `alr` against a private configuration directory.
///
/// Creates `config_dir` (an existing directory is fine) and points
/// `ALR_CONFIG` at its absolute path. When the invoker's environment carries
/// `ALIRE_DISABLE_DISTRO=true`, distribution detection is disabled in the
/// staged configuration with one `alr config` call run under `bootstrap`, so
/// a failing bootstrap aborts setup unless `bootstrap` tolerates errors.
///
/// Returns the absolute configuration directory.
pub fn prepare_env(config_dir: &Path, invoker: &mut Invoker, bootstrap: RunOptions) -> Result<PathBuf> {
    let config_dir = alr_fs::absolute_dir(config_dir)?;
    invoker
        .env_mut()
        .set(CONFIG_VAR, config_dir.to_string_lossy());
    tracing::info!(config_dir = %config_dir.display(), "Staged alr configuration directory");

    if invoker.env().distro_detection_disabled() {
        let result = invoker.run(
            &[
                "config",
                "--global",
                "--set",
                "distribution.disable_detection",
                "true",
            ],
            bootstrap,
        )?;
        if !result.success() {
            tracing::warn!(
                status = result.status,
                "Could not disable distribution detection; continuing"
            );
        }
    }

    Ok(config_dir)
}
