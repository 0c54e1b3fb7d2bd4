//! Whole-file I/O, recursive copies and lockfile staleness

use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a reader never observes a partially
/// written manifest. The temporary file lives in the target directory to
/// keep the rename on one filesystem.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

    let mut temp = NamedTempFile::new_in(&parent).map_err(|e| Error::io(&parent, e))?;

    temp.as_file()
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

    temp.write_all(content)
        .map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(temp.path(), e))?;

    temp.as_file()
        .unlock()
        .map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

    temp.persist(path).map_err(|e| Error::io(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Create `dir` if needed and return its absolute, canonical form.
///
/// An already existing directory is not an error.
pub fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    dunce::canonicalize(dir).map_err(|e| Error::io(dir, e))
}

/// Recursively copy the directory `src` to `dst`.
///
/// `dst` and any missing parents are created. Existing files in `dst` are
/// overwritten.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(Error::NotADirectory {
            path: src.to_path_buf(),
        });
    }
    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;

    for entry in fs::read_dir(src).map_err(|e| Error::io(src, e))? {
        let entry = entry.map_err(|e| Error::io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| Error::io(&from, e))?;

        if file_type.is_dir() {
            copy_dir_all(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| Error::io(&from, e))?;
        }
    }
    Ok(())
}

/// Reset the access and modification times of `path` to the Unix epoch.
///
/// Used on lockfiles after a manual manifest edit: a lockfile written in the
/// same second as the manifest would otherwise look up to date. Returns
/// `false` without touching anything when the file does not exist.
pub fn make_stale(path: &Path) -> Result<bool> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "No lockfile to age");
        return Ok(false);
    }

    let file: File = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    let times = FileTimes::new()
        .set_accessed(SystemTime::UNIX_EPOCH)
        .set_modified(SystemTime::UNIX_EPOCH);
    file.set_times(times).map_err(|e| Error::io(path, e))?;

    tracing::debug!(path = %path.display(), "Reset timestamps to epoch");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_stale_missing_file() {
        let temp = TempDir::new().unwrap();
        let touched = make_stale(&temp.path().join("alire.lock")).unwrap();
        assert!(!touched);
        assert!(!temp.path().join("alire.lock").exists());
    }

    #[test]
    fn test_make_stale_sets_epoch() {
        let temp = TempDir::new().unwrap();
        let lock = temp.path().join("alire.lock");
        fs::write(&lock, "# lock\n").unwrap();

        assert!(make_stale(&lock).unwrap());

        let modified = fs::metadata(&lock).unwrap().modified().unwrap();
        assert_eq!(modified, SystemTime::UNIX_EPOCH);
        // Content is untouched
        assert_eq!(fs::read_to_string(&lock).unwrap(), "# lock\n");
    }

    #[test]
    fn test_write_atomic_relative_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/file.txt");
        write_atomic(&path, b"data").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "data");
    }
}
