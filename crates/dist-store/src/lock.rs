//! Single-instance advisory lock
//!
//! A second process trying to take the lock fails immediately with
//! `StoreError::AlreadyRunning` instead of blocking.

use crate::error::{StoreError, StoreResult};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive `flock` held for the lifetime of the guard
pub struct InstanceLock {
    _lock: Flock<File>,
    path: PathBuf,
}

impl InstanceLock {
    /// Open (or create) `path` and take a non-blocking exclusive lock on it
    pub fn acquire(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StoreError::io(path, e))?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => {
                debug!(path = %path.display(), "acquired instance lock");
                Ok(Self {
                    _lock: lock,
                    path: path.to_path_buf(),
                })
            }
            Err((_, Errno::EWOULDBLOCK)) => Err(StoreError::AlreadyRunning {
                path: path.to_path_buf(),
            }),
            Err((_, errno)) => Err(StoreError::Lock {
                path: path.to_path_buf(),
                reason: errno.desc().to_string(),
            }),
        }
    }

    /// Path of the lock file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for InstanceLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceLock")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dist.lock");

        let held = InstanceLock::acquire(&path).unwrap();
        assert_eq!(held.path(), path.as_path());
        let err = InstanceLock::acquire(&path).unwrap_err();
        assert!(err.is_already_running());
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dist.lock");

        drop(InstanceLock::acquire(&path).unwrap());
        assert!(InstanceLock::acquire(&path).is_ok());
    }
}
