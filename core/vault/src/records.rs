//! Metadata records stored in every vault folder.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use foldervault_common::Category;

/// Description record (`desc.json`).
///
/// Free-form application payload. `storage_priority` is consulted once, when
/// the vault folder is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Short human-readable title.
    #[serde(default)]
    pub title: String,
    /// Longer free-text description.
    #[serde(default)]
    pub description: String,
    /// Arbitrary application key-value data.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Ordered tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Preferred root categories, most preferred first.
    #[serde(default)]
    pub storage_priority: Vec<Category>,
}

impl Description {
    /// Create a description with a title and everything else empty.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Lease record (`lease.json`).
///
/// Advisory only; nothing in this crate enforces or sweeps expired leases.
/// Times are Unix seconds and may be fractional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    /// When the lease runs out, or `None` for never.
    pub expires: Option<f64>,
    /// When the lease was last written.
    pub last_updated: f64,
}

impl Lease {
    /// A lease that never expires.
    pub fn never(now: f64) -> Self {
        Self {
            expires: None,
            last_updated: now,
        }
    }

    /// A lease running `duration_secs` from `now`, or forever if `None`.
    pub fn starting_at(now: f64, duration_secs: Option<u64>) -> Self {
        let expires = duration_secs.map(|secs| now + secs as f64);
        Self {
            expires,
            last_updated: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_json_keys() {
        let mut desc = Description::titled("photos");
        desc.tags.push("2024".to_string());
        desc.storage_priority = vec![Category::AutoBackup, Category::Cheap];

        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "photos",
                "description": "",
                "data": {},
                "tags": ["2024"],
                "storage_priority": ["AUTOBACKUP", "CHEAP"],
            })
        );
    }

    #[test]
    fn test_description_missing_fields_default() {
        let desc: Description = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        assert_eq!(desc, Description::titled("t"));
    }

    #[test]
    fn test_lease_never() {
        let lease = Lease::starting_at(1_000.0, None);
        assert_eq!(lease, Lease::never(1_000.0));
        assert_eq!(
            serde_json::to_value(lease).unwrap(),
            serde_json::json!({"expires": null, "last_updated": 1000.0})
        );
    }

    #[test]
    fn test_lease_duration() {
        let lease = Lease::starting_at(1_000.0, Some(86_400));
        assert_eq!(lease.expires, Some(87_400.0));
        assert_eq!(lease.last_updated, 1_000.0);
    }

    #[test]
    fn test_lease_accepts_integer_and_fractional_times() {
        let lease: Lease =
            serde_json::from_str(r#"{"expires": 1700000060.25, "last_updated": 1700000000}"#)
                .unwrap();
        assert_eq!(lease.expires, Some(1_700_000_060.25));
        assert_eq!(lease.last_updated, 1_700_000_000.0);
    }
}
