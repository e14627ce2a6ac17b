//! Lock file management for single-instance enforcement.
//!
//! Only one adhanr scheduler may drive a display at a time. The running
//! instance holds an exclusive lock on `$XDG_RUNTIME_DIR/adhanr.lock` and
//! records its PID and config directory in it, so that `adhanr status` and a
//! second `adhanr run` can tell who owns the screen.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::constants::LOCK_FILE_NAME;
use crate::common::utils;
use crate::config;

/// An acquired lock; released when dropped.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock and remove the lock file.
    pub fn release(self) {
        // Drop does the work
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Who holds the lock, as written in the lock file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOwner {
    pub pid: u32,
    pub config_dir: Option<PathBuf>,
}

/// Default lock file location.
pub fn lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(runtime_dir).join(LOCK_FILE_NAME)
}

/// Acquire the default instance lock.
///
/// Returns `Ok(None)` when another live instance holds it.
pub fn acquire_lock() -> Result<Option<InstanceLock>> {
    acquire_lock_at(&lock_path())
}

/// Acquire an exclusive lock on `path`.
///
/// A lock held by a process that no longer exists is treated as stale,
/// removed, and acquired again.
pub fn acquire_lock_at(path: &Path) -> Result<Option<InstanceLock>> {
    if let Some(lock) = try_lock(path)? {
        return Ok(Some(lock));
    }

    match read_lock_owner(path) {
        Some(owner) if utils::is_process_running(owner.pid) => Ok(None),
        Some(owner) => {
            log_warning!(
                "Removing stale lock file (process {} no longer running)",
                owner.pid
            );
            let _ = std::fs::remove_file(path);
            try_lock(path)
        }
        None => {
            // Locked but unreadable: someone is mid-write, treat as running
            Ok(None)
        }
    }
}

fn try_lock(path: &Path) -> Result<Option<InstanceLock>> {
    // Open without truncating; the current owner's details must survive a failed attempt
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))?;

    if file.try_lock_exclusive().is_err() {
        return Ok(None);
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(&file, "{}", std::process::id())?;
    // Empty line when using the default config directory
    match config::get_custom_config_dir() {
        Some(dir) => writeln!(&file, "{}", dir.display())?,
        None => writeln!(&file)?,
    }
    file.flush()?;

    Ok(Some(InstanceLock {
        file,
        path: path.to_path_buf(),
    }))
}

/// Parse the owner recorded in a lock file.
pub fn read_lock_owner(path: &Path) -> Option<LockOwner> {
    let content = std::fs::read_to_string(path).ok()?;
    let mut lines = content.lines();
    let pid = lines.next()?.trim().parse::<u32>().ok()?;
    let config_dir = lines
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from);

    Some(LockOwner { pid, config_dir })
}

/// The running instance, if one holds the default lock.
pub fn running_instance() -> Option<LockOwner> {
    read_lock_owner(&lock_path()).filter(|owner| utils::is_process_running(owner.pid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lock_records_pid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("adhanr.lock");

        let lock = acquire_lock_at(&path).unwrap().unwrap();
        let owner = read_lock_owner(lock.path()).unwrap();
        assert_eq!(owner.pid, std::process::id());
    }

    #[test]
    fn test_second_lock_is_refused_while_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("adhanr.lock");

        let first = acquire_lock_at(&path).unwrap();
        assert!(first.is_some());
        assert!(acquire_lock_at(&path).unwrap().is_none());

        drop(first);
        assert!(!path.exists());
        assert!(acquire_lock_at(&path).unwrap().is_some());
    }

    #[test]
    fn test_read_lock_owner_formats() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("adhanr.lock");

        std::fs::write(&path, "4242\n/etc/adhanr\n").unwrap();
        assert_eq!(
            read_lock_owner(&path),
            Some(LockOwner {
                pid: 4242,
                config_dir: Some(PathBuf::from("/etc/adhanr")),
            })
        );

        std::fs::write(&path, "4242\n\n").unwrap();
        assert_eq!(read_lock_owner(&path).unwrap().config_dir, None);

        std::fs::write(&path, "not a pid\n").unwrap();
        assert_eq!(read_lock_owner(&path), None);
    }
}
