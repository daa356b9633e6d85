//! Identifier to path resolution cache.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use foldervault_common::VaultId;

/// Remembers which path each vault identifier resolved to.
///
/// Cloning yields another handle to the same entries, so every session built
/// from one cache shares its contents. A hit is trusted without re-checking
/// the filesystem: once a vault's location is known it is assumed not to
/// move. A folder removed behind the cache's back leaves a stale entry until
/// `remove` or `clear` is called.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    entries: Arc<RwLock<HashMap<VaultId, PathBuf>>>,
}

impl ResolutionCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached path for `id`, if any.
    pub fn get(&self, id: &VaultId) -> Option<PathBuf> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Record the path for `id`, replacing any previous entry.
    pub fn put(&self, id: VaultId, path: PathBuf) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, path);
    }

    /// Drop the entry for `id`, returning the path it held.
    pub fn remove(&self, id: &VaultId) -> Option<PathBuf> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Wipe every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let cache = ResolutionCache::new();
        let id = VaultId::generate();
        assert!(cache.get(&id).is_none());

        cache.put(id, PathBuf::from("/v/default/x"));
        assert_eq!(cache.get(&id), Some(PathBuf::from("/v/default/x")));

        assert_eq!(cache.remove(&id), Some(PathBuf::from("/v/default/x")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = ResolutionCache::new();
        let other = cache.clone();
        let id = VaultId::generate();

        other.put(id, PathBuf::from("/v/cheap/y"));
        assert_eq!(cache.get(&id), Some(PathBuf::from("/v/cheap/y")));

        cache.clear();
        assert!(other.is_empty());
    }
}
