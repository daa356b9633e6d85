//! Vault layout constants and root configuration on disk.

use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use foldervault_common::{Category, Error, Result};
use foldervault_storage::{local, RootRegistry};

/// Lock directory inside a vault folder.
pub const LOCKS_DIRNAME: &str = "locks";

/// Payload directory inside a vault folder.
pub const DATA_DIRNAME: &str = "data";

/// Environment variable naming the configuration directory.
pub const FOLDERVAULTDIR_ENV: &str = "FOLDERVAULTDIR";

/// Configuration directory name under the home directory.
pub const FOLDERVAULTDIR_DEFAULT: &str = ".foldervault";

/// Disk map file name in the configuration directory.
pub const DISKMAP_FILENAME: &str = "diskmap.json";

/// Pick the configuration directory from an environment value and a home
/// directory.
///
/// A non-empty `env_value` wins; otherwise `<home>/.foldervault`.
///
/// # Errors
/// - `Configuration` if neither is available
pub fn resolve_config_dir(env_value: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = env_value.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    home.map(|home| home.join(FOLDERVAULTDIR_DEFAULT)).ok_or_else(|| {
        Error::Configuration(format!(
            "{} is not set and no home directory was found",
            FOLDERVAULTDIR_ENV
        ))
    })
}

/// Configuration directory for this process, from `FOLDERVAULTDIR` or the
/// home directory.
pub fn config_dir() -> Result<PathBuf> {
    resolve_config_dir(std::env::var_os(FOLDERVAULTDIR_ENV), dirs::home_dir())
}

/// The `diskmap.json` file mapping category names to root directories.
///
/// Stored as a JSON object whose key order is the root scan order:
///
/// ```json
/// { "DEFAULT": "/srv/vaults", "CHEAP": "/mnt/bulk/vaults" }
/// ```
#[derive(Debug, Clone)]
pub struct DiskMap {
    path: PathBuf,
}

impl DiskMap {
    /// Disk map inside `config_dir`.
    pub fn in_dir(config_dir: impl AsRef<Path>) -> Self {
        Self {
            path: config_dir.as_ref().join(DISKMAP_FILENAME),
        }
    }

    /// Path of the disk map file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the disk map file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the disk map into a configured registry.
    ///
    /// # Errors
    /// - I/O errors reading the file
    /// - `Serialization` if the file is not a JSON object
    /// - `Configuration` if a path is not absolute or DEFAULT is missing
    pub fn load(&self) -> Result<RootRegistry> {
        debug!("Loading disk map from {}", self.path.display());
        let map: Map<String, Value> = local::read_json(&self.path)?;
        Self::registry_from_map(map)
    }

    /// Parse disk map JSON into a configured registry.
    pub fn parse(json: &str) -> Result<RootRegistry> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        Self::registry_from_map(map)
    }

    fn registry_from_map(map: Map<String, Value>) -> Result<RootRegistry> {
        let mut roots = Vec::with_capacity(map.len());
        for (name, value) in map {
            let category: Category = name.parse()?;
            let path = match value {
                Value::String(path) => PathBuf::from(path),
                other => {
                    return Err(Error::Configuration(format!(
                        "Root for '{}' must be a path string, got {}",
                        category, other
                    )))
                }
            };
            if !path.is_absolute() {
                return Err(Error::Configuration(format!(
                    "Root for '{}' must be an absolute path: {}",
                    category,
                    path.display()
                )));
            }
            roots.push((category, path));
        }
        RootRegistry::from_roots(roots)
    }

    /// Write `registry` to the disk map file, creating the configuration
    /// directory if needed.
    pub fn save(&self, registry: &RootRegistry) -> Result<()> {
        let mut map = Map::new();
        for (category, root) in registry.iter() {
            map.insert(category.to_string(), serde_json::to_value(root)?);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        local::write_json(&self.path, &map)?;
        debug!("Saved disk map to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_dir_prefers_env() {
        let dir = resolve_config_dir(
            Some(OsString::from("/etc/fv")),
            Some(PathBuf::from("/home/someone")),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/etc/fv"));
    }

    #[test]
    fn test_config_dir_falls_back_to_home() {
        let home = Some(PathBuf::from("/home/someone"));
        assert_eq!(
            resolve_config_dir(None, home.clone()).unwrap(),
            PathBuf::from("/home/someone/.foldervault")
        );
        assert_eq!(
            resolve_config_dir(Some(OsString::new()), home).unwrap(),
            PathBuf::from("/home/someone/.foldervault")
        );
    }

    #[test]
    fn test_config_dir_nothing_available() {
        assert!(matches!(
            resolve_config_dir(None, None),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_parse_keeps_order() {
        let registry =
            DiskMap::parse(r#"{"CHEAP": "/v/cheap", "DEFAULT": "/v/default", "Lab": "/v/lab"}"#)
                .unwrap();
        let names: Vec<String> = registry.iter().map(|(c, _)| c.to_string()).collect();
        assert_eq!(names, vec!["CHEAP", "DEFAULT", "Lab"]);
        assert_eq!(
            registry.lookup(&Category::Custom("Lab".to_string())),
            Some(Path::new("/v/lab"))
        );
    }

    #[test]
    fn test_parse_requires_default() {
        let result = DiskMap::parse(r#"{"CHEAP": "/v/cheap"}"#);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_parse_rejects_relative_and_non_string() {
        assert!(matches!(
            DiskMap::parse(r#"{"DEFAULT": "vaults"}"#),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            DiskMap::parse(r#"{"DEFAULT": 7}"#),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            DiskMap::parse(r#"["DEFAULT"]"#),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config");
        let default_root = temp.path().join("default");
        let fast_root = temp.path().join("fast");

        let registry = RootRegistry::from_roots([
            (Category::Fast, fast_root.clone()),
            (Category::Default, default_root.clone()),
        ])
        .unwrap();

        let disk_map = DiskMap::in_dir(&config);
        assert!(!disk_map.exists());
        disk_map.save(&registry).unwrap();
        assert!(disk_map.exists());

        let loaded = disk_map.load().unwrap();
        assert_eq!(loaded.categories(), vec![&Category::Fast, &Category::Default]);
        assert_eq!(loaded.default_root().unwrap(), default_root.as_path());
        assert_eq!(loaded.lookup(&Category::Fast), Some(fast_root.as_path()));
    }
}
