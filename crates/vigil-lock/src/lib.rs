//! # vigil-lock
//!
//! Cross-process mutual exclusion over filesystem paths.
//!
//! Locks are OS advisory locks (`flock` on Unix, `LockFileEx` on Windows)
//! taken non-blocking through `fs2`, so a crashed holder releases its lock
//! with its file descriptors. Acquisition retries a bounded number of times
//! with doubling, capped backoff plus jitter, then fails with a typed
//! [`LockError::Timeout`].
//!
//! Handles release on drop; [`FileLocker::with_lock`] is the scoped form.

mod backoff;
mod error;
mod sequence;

pub use backoff::{base_delay, jittered_delay};
pub use error::LockError;
pub use sequence::get_sequence_numbered_path;

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use vigil_config::FileLockConfig;

/// A held lock is always retried at least once before timing out.
pub const MIN_LOCK_ATTEMPTS: u32 = 2;

/// Acquires exclusive locks according to a retry policy.
#[derive(Debug, Clone, Default)]
pub struct FileLocker {
    config: FileLockConfig,
}

impl FileLocker {
    #[must_use]
    pub const fn new(config: FileLockConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &FileLockConfig {
        &self.config
    }

    /// Take an exclusive lock on `path`.
    ///
    /// Makes up to `max_retries` attempts, never fewer than
    /// [`MIN_LOCK_ATTEMPTS`], sleeping with jittered backoff between them.
    /// Blocks the calling thread while waiting.
    ///
    /// # Errors
    ///
    /// - `LockError::NotFound` if `path` is missing and `create_if_missing` is false
    /// - `LockError::Timeout` once every attempt found the lock held
    /// - `LockError::Io` for any other open/lock failure
    pub fn lock(&self, path: &Path, create_if_missing: bool) -> Result<FileLockHandle, LockError> {
        let file = open_lock_target(path, create_if_missing)?;
        let attempts = self.config.max_retries.max(MIN_LOCK_ATTEMPTS);

        for attempt in 0..attempts {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), attempt, "file lock acquired");
                    return Ok(FileLockHandle {
                        file: Some(file),
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_contended(&e) => {
                    if attempt + 1 < attempts {
                        let delay = jittered_delay(
                            attempt,
                            self.config.base_backoff_ms,
                            self.config.max_backoff_ms,
                        );
                        tracing::debug!(
                            path = %path.display(),
                            attempt,
                            delay_ms = delay.as_millis(),
                            "file lock busy, backing off"
                        );
                        std::thread::sleep(delay);
                    }
                }
                Err(source) => {
                    return Err(LockError::Io {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        tracing::warn!(path = %path.display(), attempts, "file lock timed out");
        Err(LockError::Timeout {
            path: path.to_path_buf(),
            attempts,
        })
    }

    /// Release a lock. Idempotent; failures are logged, never returned.
    pub fn unlock(&self, handle: &mut FileLockHandle) {
        handle.release();
    }

    /// Run `f` while holding the lock on `path`; the lock is released when
    /// `f` returns or unwinds.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error from [`Self::lock`]; `f` is not run.
    pub fn with_lock<T>(
        &self,
        path: &Path,
        create_if_missing: bool,
        f: impl FnOnce(&File) -> T,
    ) -> Result<T, LockError> {
        let handle = self.lock(path, create_if_missing)?;
        let result = handle.file.as_ref().map(f);
        drop(handle);
        result.ok_or_else(|| LockError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("lock handle released before use"),
        })
    }

    /// See [`get_sequence_numbered_path`].
    ///
    /// # Errors
    ///
    /// Returns `LockError::SequenceExhausted` if every candidate exists.
    pub fn get_sequence_numbered_path(
        &self,
        base: &Path,
        max_sequence: u32,
    ) -> Result<PathBuf, LockError> {
        get_sequence_numbered_path(base, max_sequence)
    }
}

/// An exclusive lock bound to one path. Released on drop.
#[derive(Debug)]
pub struct FileLockHandle {
    file: Option<File>,
    path: PathBuf,
}

impl FileLockHandle {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// The locked file, while the lock is held.
    #[must_use]
    pub const fn file(&self) -> Option<&File> {
        self.file.as_ref()
    }

    /// Release the lock. Safe to call any number of times.
    pub fn release(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        if let Err(e) = FileExt::unlock(&file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release file lock");
        } else {
            tracing::debug!(path = %self.path.display(), "file lock released");
        }
    }
}

impl Drop for FileLockHandle {
    fn drop(&mut self) {
        self.release();
    }
}

fn open_lock_target(path: &Path, create_if_missing: bool) -> Result<File, LockError> {
    if create_if_missing {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LockError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    OpenOptions::new()
        .read(true)
        .write(true)
        .create(create_if_missing)
        .truncate(false)
        .open(path)
        .map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LockError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                LockError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_locker(max_retries: u32) -> FileLocker {
        FileLocker::new(FileLockConfig {
            max_retries,
            base_backoff_ms: 1,
            max_backoff_ms: 4,
        })
    }

    #[test]
    fn release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let locker = fast_locker(2);
        let mut handle = locker.lock(&dir.path().join("a.lock"), true).unwrap();
        assert!(handle.is_held());
        locker.unlock(&mut handle);
        locker.unlock(&mut handle);
        assert!(!handle.is_held());
    }

    #[test]
    fn single_attempt_config_still_retries_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("held.lock");
        let _holder = fast_locker(2).lock(&path, true).unwrap();

        let err = fast_locker(1).lock(&path, true).unwrap_err();
        assert!(matches!(err, LockError::Timeout { attempts: 2, .. }));
    }

    #[test]
    fn missing_target_without_create_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = fast_locker(2)
            .lock(&dir.path().join("absent.lock"), false)
            .unwrap_err();
        assert!(matches!(err, LockError::NotFound { .. }));
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/x.lock");
        let handle = fast_locker(1).lock(&path, true).unwrap();
        assert!(path.is_file());
        assert_eq!(handle.path(), path.as_path());
    }
}
