//! Advisory file lock service.

use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

use crate::service::LockService;
use foldervault_common::{Error, Result};

/// Name of the lock file created inside a locked directory.
pub const LOCK_FILENAME: &str = "lock";

/// Lock service backed by exclusive advisory locks on `<dir>/lock`.
///
/// Held locks keep their file handle open until released; dropping the
/// service releases everything it holds. Locks are per service instance,
/// so two instances in one process exclude each other just like two
/// processes do.
#[derive(Debug, Default)]
pub struct FileLockService {
    held: Mutex<HashMap<PathBuf, File>>,
}

impl FileLockService {
    /// Create a new lock service holding no locks.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_path(dir: &Path) -> PathBuf {
        dir.join(LOCK_FILENAME)
    }

    fn open_lock_file(dir: &Path) -> Result<File> {
        let path = Self::lock_path(dir);
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::Lock(format!("Failed to open {}: {}", path.display(), e)))
    }

    /// Record who holds the lock. Purely informational.
    fn write_owner(file: &mut File) {
        let owner = format!(
            "pid={} acquired={}\n",
            std::process::id(),
            chrono::Utc::now().timestamp()
        );
        if let Err(e) = Self::overwrite(file, owner.as_bytes()) {
            warn!("Failed to write lock owner record: {}", e);
        }
    }

    fn overwrite(file: &mut File, contents: &[u8]) -> std::io::Result<()> {
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(contents)?;
        file.flush()
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Read a try-lock result as "held by someone else". Only contention
/// counts; any other failure is logged and reported as not held.
fn contention_from(path: &Path, result: std::io::Result<()>) -> bool {
    match result {
        Ok(()) => false,
        Err(e) if is_contended(&e) => true,
        Err(e) => {
            warn!("Cannot check lock on {}: {}", path.display(), e);
            false
        }
    }
}

impl LockService for FileLockService {
    fn name(&self) -> &str {
        "file"
    }

    fn acquire(&self, dir: &Path) -> Result<bool> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if held.contains_key(dir) {
            return Ok(true);
        }

        let mut file = Self::open_lock_file(dir)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                Self::write_owner(&mut file);
                held.insert(dir.to_path_buf(), file);
                debug!("Acquired lock on {}", dir.display());
                Ok(true)
            }
            Err(e) if is_contended(&e) => {
                debug!("Lock on {} is held elsewhere", dir.display());
                Ok(false)
            }
            Err(e) => Err(Error::Lock(format!(
                "Failed to lock {}: {}",
                dir.display(),
                e
            ))),
        }
    }

    fn release(&self, dir: &Path) -> Result<()> {
        let file = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(dir);

        if let Some(file) = file {
            // Still valid if the directory was removed while held.
            file.unlock()
                .map_err(|e| Error::Lock(format!("Failed to unlock {}: {}", dir.display(), e)))?;
            debug!("Released lock on {}", dir.display());
        }
        Ok(())
    }

    fn owned_by_me(&self, dir: &Path) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(dir)
    }

    fn is_held_by_other(&self, dir: &Path) -> bool {
        if self.owned_by_me(dir) {
            return false;
        }

        let path = Self::lock_path(dir);
        let file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => file,
            // Never locked, or the folder is gone.
            Err(e) if e.kind() == ErrorKind::NotFound => return false,
            Err(e) => {
                warn!("Cannot open {} to check lock: {}", path.display(), e);
                return false;
            }
        };

        let result = file.try_lock_exclusive();
        if result.is_ok() {
            let _ = file.unlock();
        }
        contention_from(&path, result)
    }
}
