//! Common types used throughout FolderVault.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a vault folder.
///
/// Always a version-4 UUID. The canonical hyphenated form is used verbatim
/// as the folder name beneath whichever root holds the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultId(Uuid);

impl VaultId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form.
    ///
    /// # Errors
    /// - Returns error if `id` is not a UUID
    pub fn parse(id: &str) -> crate::Result<Self> {
        Uuid::parse_str(id.trim())
            .map(Self)
            .map_err(|e| crate::Error::InvalidInput(format!("invalid vault id '{}': {}", id, e)))
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Folder name used for this vault beneath a root.
    pub fn folder_name(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for VaultId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

/// Storage category of a root directory.
///
/// The well-known categories describe common storage characteristics;
/// callers may define their own with `Custom`.
///
/// Names are kept exactly as written, so a `storage_priority` read from disk
/// is written back unchanged. Comparison folds ASCII case for the well-known
/// names only: `Custom("cheap")` and `Custom("CHEAP")` both equal `Cheap`,
/// while `Custom("Lab")` and `Custom("lab")` stay distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    /// Cheap storage, for some meaning of cheap.
    Cheap,
    /// Very large drives.
    Plentiful,
    /// Directories that are backed up automatically.
    AutoBackup,
    /// Fast drives.
    Fast,
    /// Network mapped drives.
    Network,
    /// Mandatory fallback root.
    Default,
    /// Caller-defined category, name kept verbatim.
    Custom(String),
}

const WELL_KNOWN: [&str; 6] = [
    "CHEAP",
    "PLENTIFUL",
    "AUTOBACKUP",
    "FAST",
    "NETWORK",
    "DEFAULT",
];

impl Category {
    /// Name of the category as written.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Cheap => "CHEAP",
            Category::Plentiful => "PLENTIFUL",
            Category::AutoBackup => "AUTOBACKUP",
            Category::Fast => "FAST",
            Category::Network => "NETWORK",
            Category::Default => "DEFAULT",
            Category::Custom(name) => name,
        }
    }

    /// Name used for equality and hashing.
    fn key(&self) -> &str {
        match self {
            Category::Custom(name) => WELL_KNOWN
                .iter()
                .copied()
                .find(|known| known.eq_ignore_ascii_case(name))
                .unwrap_or(name.as_str()),
            other => other.as_str(),
        }
    }

    /// Check if this is the mandatory DEFAULT category.
    pub fn is_default(&self) -> bool {
        self.key() == "DEFAULT"
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::Error;

    /// Exact well-known names give their variant; anything else is `Custom`
    /// with the (trimmed) name kept as is.
    fn from_str(s: &str) -> crate::Result<Self> {
        let name = s.trim();
        if name.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Category name cannot be empty".to_string(),
            ));
        }

        let category = match name {
            "CHEAP" => Category::Cheap,
            "PLENTIFUL" => Category::Plentiful,
            "AUTOBACKUP" => Category::AutoBackup,
            "FAST" => Category::Fast,
            "NETWORK" => Category::Network,
            "DEFAULT" => Category::Default,
            _ => Category::Custom(name.to_string()),
        };
        Ok(category)
    }
}

impl TryFrom<String> for Category {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

/// Metadata records stored at the top level of a vault folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Description record.
    Description,
    /// Lease (expiration) record.
    Lease,
    /// Forwarding record.
    Forward,
}

impl RecordKind {
    /// All record kinds, in save/load order.
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Description,
        RecordKind::Lease,
        RecordKind::Forward,
    ];

    /// File name of the record within the vault folder.
    pub fn filename(&self) -> &'static str {
        match self {
            RecordKind::Description => "desc.json",
            RecordKind::Lease => "lease.json",
            RecordKind::Forward => "fwd.json",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filename())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_id_generate_is_v4() {
        let id = VaultId::generate();
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_ne!(id, VaultId::generate());
    }

    #[test]
    fn test_vault_id_parse() {
        let id = VaultId::parse("6f1c2a4e-9b3d-4c7a-8e2f-0a1b2c3d4e5f").unwrap();
        assert_eq!(id.folder_name(), "6f1c2a4e-9b3d-4c7a-8e2f-0a1b2c3d4e5f");
        assert_eq!(id.to_string(), id.folder_name());
    }

    #[test]
    fn test_vault_id_rejects_paths() {
        assert!(VaultId::parse("").is_err());
        assert!(VaultId::parse("../etc").is_err());
        assert!(VaultId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_vault_id_serializes_as_string() {
        let id = VaultId::parse("6f1c2a4e-9b3d-4c7a-8e2f-0a1b2c3d4e5f").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6f1c2a4e-9b3d-4c7a-8e2f-0a1b2c3d4e5f\"");
    }

    #[test]
    fn test_category_parse_well_known() {
        assert_eq!("CHEAP".parse::<Category>().unwrap(), Category::Cheap);
        assert_eq!("default".parse::<Category>().unwrap(), Category::Default);
        assert_eq!(
            "AutoBackup".parse::<Category>().unwrap(),
            Category::AutoBackup
        );
    }

    #[test]
    fn test_category_custom_kept_verbatim() {
        let category: Category = "Scratch".parse().unwrap();
        assert_eq!(category, Category::Custom("Scratch".to_string()));
        assert_eq!(category.as_str(), "Scratch");
    }

    #[test]
    fn test_category_names_round_trip_verbatim() {
        let parsed: Vec<Category> = serde_json::from_str(r#"["cheap","Default","Lab"]"#).unwrap();
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"["cheap","Default","Lab"]"#
        );
    }

    #[test]
    fn test_category_custom_well_known_name_is_same_category() {
        let custom_default = Category::Custom("DEFAULT".to_string());
        assert_eq!(custom_default, Category::Default);
        assert!(custom_default.is_default());
        assert_eq!(Category::Custom("cheap".to_string()), Category::Cheap);
        assert_ne!(
            Category::Custom("Lab".to_string()),
            Category::Custom("lab".to_string())
        );

        let set: std::collections::HashSet<Category> = [
            Category::Fast,
            Category::Custom("FAST".to_string()),
            Category::Custom("fast".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_category_empty_fails() {
        assert!("".parse::<Category>().is_err());
        assert!("   ".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&vec![Category::Fast, Category::Default]).unwrap();
        assert_eq!(json, r#"["FAST","DEFAULT"]"#);

        let parsed: Vec<Category> = serde_json::from_str(r#"["network","Mine"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![Category::Network, Category::Custom("Mine".to_string())]
        );

        assert!(serde_json::from_str::<Category>(r#""""#).is_err());
    }

    #[test]
    fn test_record_filenames() {
        assert_eq!(RecordKind::Description.filename(), "desc.json");
        assert_eq!(RecordKind::Lease.filename(), "lease.json");
        assert_eq!(RecordKind::Forward.filename(), "fwd.json");
    }
}
