//! Vault manager for configuring roots and opening sessions.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::{config_dir, DiskMap};
use crate::session::VaultSession;
use foldervault_common::{Category, Result};
use foldervault_lock::{FileLockService, LockService};
use foldervault_storage::{ResolutionCache, RootRegistry};

/// Owns the pieces every session shares: the root registry, one resolution
/// cache, and one lock service.
pub struct VaultManager {
    registry: RootRegistry,
    cache: ResolutionCache,
    locks: Arc<dyn LockService>,
}

impl VaultManager {
    /// Create a manager over `registry` using advisory file locks.
    pub fn new(registry: RootRegistry) -> Self {
        Self::with_lock_service(registry, Arc::new(FileLockService::new()))
    }

    /// Create with a custom lock service.
    pub fn with_lock_service(registry: RootRegistry, locks: Arc<dyn LockService>) -> Self {
        Self {
            registry,
            cache: ResolutionCache::new(),
            locks,
        }
    }

    /// Create a manager from the disk map in `config_dir`.
    ///
    /// # Errors
    /// - Disk map missing or invalid
    pub fn from_config_dir(config_dir: impl AsRef<Path>) -> Result<Self> {
        let disk_map = DiskMap::in_dir(config_dir);
        let registry = disk_map.load()?;
        info!("Loaded {} roots from {}", registry.len(), disk_map.path().display());
        Ok(Self::new(registry))
    }

    /// Create a manager from the process configuration directory
    /// (`FOLDERVAULTDIR` or `~/.foldervault`).
    pub fn from_environment() -> Result<Self> {
        Self::from_config_dir(config_dir()?)
    }

    /// Get the root registry.
    pub fn registry(&self) -> &RootRegistry {
        &self.registry
    }

    /// Replace the roots used by sessions opened from now on.
    ///
    /// # Errors
    /// - `Configuration` if DEFAULT is missing
    pub fn configure<I, P>(&mut self, mapping: I) -> Result<()>
    where
        I: IntoIterator<Item = (Category, P)>,
        P: Into<PathBuf>,
    {
        self.registry.configure(mapping)
    }

    /// Get the shared resolution cache.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Open a fresh session sharing this manager's cache and lock service.
    pub fn session(&self) -> VaultSession {
        VaultSession::new(self.registry.clone(), self.cache.clone(), self.locks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldervault_lock::MemoryLockService;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_config_dir() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("vaults");
        fs::create_dir(&root).unwrap();

        let registry = RootRegistry::from_roots([(Category::Default, root.clone())]).unwrap();
        DiskMap::in_dir(temp.path()).save(&registry).unwrap();

        let manager = VaultManager::from_config_dir(temp.path()).unwrap();
        assert_eq!(manager.registry().default_root().unwrap(), root.as_path());
    }

    #[test]
    fn test_from_config_dir_missing_map() {
        let temp = TempDir::new().unwrap();
        assert!(VaultManager::from_config_dir(temp.path()).is_err());
    }

    #[test]
    fn test_sessions_share_cache() {
        let temp = TempDir::new().unwrap();
        let registry =
            RootRegistry::from_roots([(Category::Default, temp.path().to_path_buf())]).unwrap();
        let manager =
            VaultManager::with_lock_service(registry, Arc::new(MemoryLockService::new()));

        let mut first = manager.session();
        let id = first.new_identifier();
        let path = first.create_path().unwrap();
        assert_eq!(manager.cache().get(&id), Some(path.clone()));

        let mut second = manager.session();
        second.set_identifier(id);
        assert_eq!(second.locate().unwrap(), Some(path));
    }

    #[test]
    fn test_configure_applies_to_new_sessions() {
        let temp = TempDir::new().unwrap();
        let fast = temp.path().join("fast");
        fs::create_dir(&fast).unwrap();

        let registry =
            RootRegistry::from_roots([(Category::Default, temp.path().to_path_buf())]).unwrap();
        let mut manager = VaultManager::new(registry);
        manager
            .configure([
                (Category::Default, temp.path().to_path_buf()),
                (Category::Fast, fast.clone()),
            ])
            .unwrap();

        let mut session = manager.session();
        session.new_identifier();
        session.description_mut().unwrap().storage_priority = vec![Category::Fast];
        assert!(session.create_path().unwrap().starts_with(&fast));
    }
}
