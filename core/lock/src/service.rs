//! Lock service trait definition.

use std::path::Path;

use foldervault_common::Result;

/// Mutual exclusion over a directory.
///
/// Every call names the directory being locked (a vault folder's `locks`
/// subdirectory). Acquisition is try-once: implementations never block or
/// retry, retry policy belongs to the caller.
pub trait LockService: Send + Sync {
    /// Get the service name (e.g., "file", "memory").
    fn name(&self) -> &str;

    /// Try to take exclusive ownership of `dir`.
    ///
    /// # Returns
    /// - `Ok(true)` if this service now holds the lock, including when it
    ///   already held it
    /// - `Ok(false)` if someone else holds it
    ///
    /// # Errors
    /// - I/O failures while preparing the lock (e.g. `dir` missing)
    fn acquire(&self, dir: &Path) -> Result<bool>;

    /// Give up ownership of `dir`. A no-op if not held.
    fn release(&self, dir: &Path) -> Result<()>;

    /// Check if this service currently holds the lock on `dir`.
    fn owned_by_me(&self, dir: &Path) -> bool;

    /// Check if some other owner holds the lock on `dir`.
    ///
    /// Best-effort only: the answer can be stale by the time it is used,
    /// and implementations may not see every kind of holder.
    fn is_held_by_other(&self, dir: &Path) -> bool;
}
