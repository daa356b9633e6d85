//! Vault session management.
//!
//! A session holds one "current" vault folder at a time: its identifier, its
//! resolved path, and in-memory copies of its three metadata records. The
//! records are only written to disk by [`VaultSession::save`].
//!
//! Sessions are not meant to be shared between threads; use one session per
//! thread of control. Sessions built from the same [`ResolutionCache`] share
//! cache entries.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{DATA_DIRNAME, LOCKS_DIRNAME};
use crate::records::{Description, Lease};
use foldervault_common::{Category, Error, RecordKind, Result, VaultId};
use foldervault_lock::LockService;
use foldervault_storage::{local, ResolutionCache, RootRegistry};

/// Working state for one vault folder at a time.
pub struct VaultSession {
    /// Configured storage roots.
    roots: RootRegistry,
    /// Identifier to path cache, possibly shared with other sessions.
    cache: ResolutionCache,
    /// Mutual exclusion over vault folders.
    locks: Arc<dyn LockService>,
    /// Current vault identifier.
    id: Option<VaultId>,
    /// In-memory description record.
    description: Option<Description>,
    /// In-memory lease record.
    lease: Option<Lease>,
    /// In-memory forward record. Never `Some(Value::Null)`.
    forward: Option<Value>,
    /// Last located or created vault folder.
    path: Option<PathBuf>,
}

impl VaultSession {
    /// Create a session over already configured roots.
    ///
    /// # Postconditions
    /// - No identifier, no current path
    /// - Records hold their cleared defaults (see [`VaultSession::clear`])
    pub fn new(roots: RootRegistry, cache: ResolutionCache, locks: Arc<dyn LockService>) -> Self {
        let mut session = Self {
            roots,
            cache,
            locks,
            id: None,
            description: None,
            lease: None,
            forward: None,
            path: None,
        };
        session.clear();
        session
    }

    /// Replace the storage roots.
    ///
    /// The resolution cache is left alone; call [`VaultSession::reset`] or
    /// clear the cache if existing roots changed meaning.
    ///
    /// # Errors
    /// - `Configuration` if DEFAULT is missing
    pub fn configure<I, P>(&mut self, mapping: I) -> Result<()>
    where
        I: IntoIterator<Item = (Category, P)>,
        P: Into<PathBuf>,
    {
        self.roots.configure(mapping)
    }

    /// Return to the initial, unconfigured state.
    ///
    /// Forgets the current path, every root, and every cache entry (for all
    /// sessions sharing the cache), then clears the records.
    pub fn reset(&mut self) {
        self.path = None;
        self.roots.reset();
        self.cache.clear();
        self.clear();
    }

    /// Clear the identifier and reset records to their defaults.
    ///
    /// The description becomes empty, the lease never expires (last updated
    /// now), and the forward record is absent. The current path and the
    /// cache are untouched.
    pub fn clear(&mut self) {
        self.id = None;
        self.description = Some(Description::default());
        self.lease = Some(Lease::never(local::timestamp()));
        self.forward = None;
    }

    /// Generate a fresh identifier and make it current.
    ///
    /// Records and path left over from a previous vault are not touched;
    /// call [`VaultSession::clear`] first if that matters.
    pub fn new_identifier(&mut self) -> VaultId {
        let id = VaultId::generate();
        debug!("Generated vault id {}", id);
        self.id = Some(id);
        id
    }

    /// Make `id` the current identifier.
    pub fn set_identifier(&mut self, id: VaultId) {
        self.id = Some(id);
    }

    /// Current identifier, if any.
    pub fn identifier(&self) -> Option<&VaultId> {
        self.id.as_ref()
    }

    /// Current vault folder path, if located or created.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Configured storage roots.
    pub fn roots(&self) -> &RootRegistry {
        &self.roots
    }

    /// The resolution cache this session uses.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// In-memory description record.
    pub fn description(&self) -> Option<&Description> {
        self.description.as_ref()
    }

    /// Mutable in-memory description record.
    pub fn description_mut(&mut self) -> Option<&mut Description> {
        self.description.as_mut()
    }

    /// Replace the in-memory description record.
    pub fn set_description(&mut self, description: Option<Description>) {
        self.description = description;
    }

    /// In-memory lease record.
    pub fn lease(&self) -> Option<&Lease> {
        self.lease.as_ref()
    }

    /// Renew the lease for `duration_secs` from now, or forever if `None`.
    ///
    /// Pure metadata; nothing enforces expiry.
    pub fn set_lease(&mut self, duration_secs: Option<u64>) {
        self.lease = Some(Lease::starting_at(local::timestamp(), duration_secs));
    }

    /// In-memory forward record.
    pub fn forward(&self) -> Option<&Value> {
        self.forward.as_ref()
    }

    /// Replace the forward record. JSON `null` is stored as absent.
    pub fn set_forward(&mut self, forward: Option<Value>) {
        self.forward = forward.filter(|value| !value.is_null());
    }

    fn require_id(&self) -> Result<VaultId> {
        self.id.ok_or(Error::MissingIdentifier)
    }

    fn require_path(&self) -> Result<&Path> {
        match self.path.as_deref() {
            Some(path) if path.is_dir() => Ok(path),
            Some(path) => Err(Error::InvalidState(format!(
                "Vault folder no longer exists: {}",
                path.display()
            ))),
            None => Err(Error::InvalidState(
                "No current vault folder; call locate or create_path first".to_string(),
            )),
        }
    }

    /// Lock directory of the current vault folder.
    pub fn locks_dir(&self) -> Result<PathBuf> {
        self.path
            .as_ref()
            .map(|path| path.join(LOCKS_DIRNAME))
            .ok_or_else(|| Error::InvalidState("No current vault folder".to_string()))
    }

    /// Payload directory of the current vault folder.
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.path
            .as_ref()
            .map(|path| path.join(DATA_DIRNAME))
            .ok_or_else(|| Error::InvalidState("No current vault folder".to_string()))
    }

    /// Find the vault folder for the current identifier.
    ///
    /// A cache hit is returned without checking the filesystem. On a miss,
    /// roots are scanned in configuration order and the first one holding
    /// the folder wins and is cached.
    ///
    /// # Returns
    /// - `Ok(Some(path))` and the path becomes current
    /// - `Ok(None)` if no root holds the folder; the current path is cleared
    ///
    /// # Errors
    /// - `MissingIdentifier` if no identifier is set
    pub fn locate(&mut self) -> Result<Option<PathBuf>> {
        let id = self.require_id()?;

        if let Some(path) = self.cache.get(&id) {
            debug!("Cache hit for {}: {}", id, path.display());
            self.path = Some(path.clone());
            return Ok(Some(path));
        }

        let folder = id.folder_name();
        for (category, root) in self.roots.iter() {
            let candidate = root.join(&folder);
            if candidate.exists() {
                debug!("Found {} under {} root", id, category);
                self.cache.put(id, candidate.clone());
                self.path = Some(candidate.clone());
                return Ok(Some(candidate));
            }
        }

        debug!("Vault {} not found under any root", id);
        self.path = None;
        Ok(None)
    }

    /// Create a new vault folder for the current identifier.
    ///
    /// The root is the first category of the description's
    /// `storage_priority` that has a configured root, or DEFAULT. The folder
    /// and its `locks` and `data` subdirectories are created.
    ///
    /// A failure after the folder itself was created leaves an incomplete
    /// folder behind. No rollback is attempted; the error names the folder
    /// so it can be removed by hand.
    ///
    /// # Postconditions
    /// - The new path is cached and current
    ///
    /// # Errors
    /// - `MissingIdentifier` if no identifier is set
    /// - `Configuration` if no root could be selected
    /// - `Placement` if the root is unusable or the folder already exists
    pub fn create_path(&mut self) -> Result<PathBuf> {
        let id = self.require_id()?;
        let priority = self
            .description
            .as_ref()
            .map(|desc| desc.storage_priority.as_slice())
            .unwrap_or_default();

        let (category, root) = self.roots.select(priority)?;
        if !root.is_dir() {
            return Err(Error::Placement(format!(
                "{} root does not exist or is not a directory: {}",
                category,
                root.display()
            )));
        }

        let target = root.join(id.folder_name());
        local::make_dir(&target).map_err(|e| match e {
            Error::Placement(_) => e,
            other => Error::Placement(format!(
                "Cannot create {} under {} root: {}",
                target.display(),
                category,
                other
            )),
        })?;

        create_layout(&target)?;

        info!("Created vault {} under {} root", id, category);
        self.cache.put(id, target.clone());
        self.path = Some(target.clone());
        Ok(target)
    }

    /// Write the in-memory records to the current vault folder.
    ///
    /// Present records are written to their files; absent ones have their
    /// file removed rather than written empty.
    ///
    /// # Errors
    /// - `InvalidState` if there is no current vault folder
    pub fn save(&self) -> Result<()> {
        let path = self.require_path()?;
        save_record(path, RecordKind::Description, self.description.as_ref())?;
        save_record(path, RecordKind::Lease, self.lease.as_ref())?;
        save_record(path, RecordKind::Forward, self.forward.as_ref())?;
        debug!("Saved records to {}", path.display());
        Ok(())
    }

    /// Read the records of the current vault folder into memory.
    ///
    /// A missing file makes the corresponding record absent.
    ///
    /// # Errors
    /// - `InvalidState` if there is no current vault folder
    /// - `Serialization` if a file does not hold a valid record
    pub fn load(&mut self) -> Result<()> {
        let path = self.require_path()?.to_path_buf();
        self.description = load_record(&path, RecordKind::Description)?;
        self.lease = load_record(&path, RecordKind::Lease)?;
        self.forward = load_record::<Value>(&path, RecordKind::Forward)?
            .filter(|value| !value.is_null());
        debug!("Loaded records from {}", path.display());
        Ok(())
    }

    /// Try to take exclusive ownership of the current vault folder.
    ///
    /// # Returns
    /// - `Ok(Some(data_dir))` when the lock is held (also if already held)
    /// - `Ok(None)` when another owner holds it
    ///
    /// # Errors
    /// - `InvalidState` if there is no current vault folder
    pub fn lock(&self) -> Result<Option<PathBuf>> {
        let locks_dir = self.locks_dir()?;
        if self.locks.acquire(&locks_dir)? {
            info!("Locked {} ({} lock)", locks_dir.display(), self.locks.name());
            Ok(Some(self.data_dir()?))
        } else {
            Ok(None)
        }
    }

    /// Check if this session's lock service holds the current vault folder.
    pub fn have_lock(&self) -> bool {
        self.locks_dir()
            .map(|dir| self.locks.owned_by_me(&dir))
            .unwrap_or(false)
    }

    /// Check if someone else holds the current vault folder.
    ///
    /// Best-effort: the answer may already be stale when it is returned.
    pub fn in_use(&self) -> bool {
        self.locks_dir()
            .map(|dir| self.locks.is_held_by_other(&dir))
            .unwrap_or(false)
    }

    /// Release the lock on the current vault folder. A no-op if not held.
    pub fn unlock(&self) -> Result<()> {
        match self.locks_dir() {
            Ok(dir) => self.locks.release(&dir),
            Err(_) => Ok(()),
        }
    }

    /// Permanently remove the current vault folder and everything in it.
    ///
    /// # Preconditions
    /// - The lock is held ([`VaultSession::have_lock`])
    ///
    /// # Postconditions
    /// - The folder no longer exists
    /// - The lock handle is released and the cache entry evicted
    /// - There is no current path; identifier and records are kept
    ///
    /// # Errors
    /// - `NotLocked` if the lock is not held
    pub fn delete(&mut self) -> Result<()> {
        if !self.have_lock() {
            return Err(Error::NotLocked);
        }
        let path = self.require_path()?.to_path_buf();

        local::remove_tree(&path)?;
        info!("Deleted vault folder {}", path.display());

        if let Err(e) = self.locks.release(&path.join(LOCKS_DIRNAME)) {
            warn!("Failed to release lock after delete: {}", e);
        }
        if let Some(id) = self.id {
            self.cache.remove(&id);
        }
        self.path = None;
        Ok(())
    }
}

/// Create the `locks` and `data` subdirectories of a fresh vault folder.
fn create_layout(target: &Path) -> Result<()> {
    for sub in [LOCKS_DIRNAME, DATA_DIRNAME] {
        local::make_dir(&target.join(sub)).map_err(|e| {
            Error::Placement(format!(
                "Vault folder {} is incomplete (creating '{}' failed: {}); remove it manually",
                target.display(),
                sub,
                e
            ))
        })?;
    }
    Ok(())
}

fn save_record<T: Serialize>(dir: &Path, kind: RecordKind, value: Option<&T>) -> Result<()> {
    let file = dir.join(kind.filename());
    match value {
        Some(value) => local::write_json(&file, value),
        None => {
            if local::remove_file_if_exists(&file)? {
                debug!("Removed {}", file.display());
            }
            Ok(())
        }
    }
}

fn load_record<T: DeserializeOwned>(dir: &Path, kind: RecordKind) -> Result<Option<T>> {
    let file = dir.join(kind.filename());
    if !file.exists() {
        return Ok(None);
    }
    local::read_json(&file).map(Some)
}
