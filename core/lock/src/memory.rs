//! In-memory lock service for testing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::service::LockService;
use foldervault_common::Result;

#[derive(Debug, Default)]
struct LockTable {
    mine: HashSet<PathBuf>,
    foreign: HashSet<PathBuf>,
}

/// In-memory lock service.
///
/// Useful for testing. Nothing touches the filesystem; a lock held "by
/// another process" is simulated with [`MemoryLockService::hold_as_other`].
#[derive(Debug, Clone, Default)]
pub struct MemoryLockService {
    table: Arc<Mutex<LockTable>>,
}

impl MemoryLockService {
    /// Create a new lock service holding no locks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `dir` as held by a foreign owner.
    pub fn hold_as_other(&self, dir: impl AsRef<Path>) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .foreign
            .insert(dir.as_ref().to_path_buf());
    }

    /// Drop a foreign hold on `dir`.
    pub fn release_other(&self, dir: impl AsRef<Path>) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .foreign
            .remove(dir.as_ref());
    }
}

impl LockService for MemoryLockService {
    fn name(&self) -> &str {
        "memory"
    }

    fn acquire(&self, dir: &Path) -> Result<bool> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if table.foreign.contains(dir) {
            return Ok(false);
        }
        table.mine.insert(dir.to_path_buf());
        Ok(true)
    }

    fn release(&self, dir: &Path) -> Result<()> {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mine
            .remove(dir);
        Ok(())
    }

    fn owned_by_me(&self, dir: &Path) -> bool {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mine
            .contains(dir)
    }

    fn is_held_by_other(&self, dir: &Path) -> bool {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .foreign
            .contains(dir)
    }
}
