//! Local filesystem helpers.
//!
//! Thin wrappers over `std::fs` and `serde_json` used by the vault session.
//! All calls are synchronous.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use foldervault_common::{Error, Result};

/// Create a single directory. The parent must exist and `path` must not.
///
/// # Errors
/// - `AlreadyExists` if `path` exists
/// - I/O errors (missing parent, permission denied)
pub fn make_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => {
            debug!("Created directory {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::Placement(format!(
            "Path already exists: {}",
            path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Recursively delete a directory and everything in it.
pub fn remove_tree(path: &Path) -> Result<()> {
    fs::remove_dir_all(path)?;
    debug!("Removed directory tree {}", path.display());
    Ok(())
}

/// Delete a file if present. Returns whether a file was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Serialize `value` as JSON into `path`, replacing any previous content.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read and deserialize the JSON file at `path`.
///
/// # Errors
/// - I/O errors, including `NotFound`
/// - `Serialization` if the content does not match `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        Error::Serialization(format!("{}: {}", path.display(), e))
    })
}

/// Current time as Unix seconds, with millisecond precision.
pub fn timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_make_dir_refuses_existing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("vault");

        make_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert!(matches!(make_dir(&dir), Err(Error::Placement(_))));
    }

    #[test]
    fn test_make_dir_missing_parent_fails() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("missing").join("vault");
        assert!(matches!(make_dir(&dir), Err(Error::Io(_))));
    }

    #[test]
    fn test_json_write_read() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("data.json");

        let mut value = BTreeMap::new();
        value.insert("answer".to_string(), 42);
        write_json(&file, &value).unwrap();

        let loaded: BTreeMap<String, i32> = read_json(&file).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_read_json_bad_content() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("bad.json");
        fs::write(&file, "{not json").unwrap();

        let result: Result<serde_json::Value> = read_json(&file);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_remove_file_if_exists() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("gone.json");
        assert!(!remove_file_if_exists(&file).unwrap());

        fs::write(&file, "null").unwrap();
        assert!(remove_file_if_exists(&file).unwrap());
        assert!(!file.exists());
    }

    #[test]
    fn test_remove_tree() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("tree");
        fs::create_dir_all(dir.join("a").join("b")).unwrap();
        fs::write(dir.join("a").join("f.txt"), "x").unwrap();

        remove_tree(&dir).unwrap();
        assert!(!dir.exists());
    }
}
