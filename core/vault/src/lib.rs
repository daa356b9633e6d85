//! Vault folder engine for FolderVault.
//!
//! This module provides:
//! - Placement of new vault folders across categorized storage roots
//! - Resolution of existing vault folders by identifier
//! - Persistence of the description, lease, and forward records
//! - Exclusive single-writer locking and deletion
//!
//! # Architecture
//! A [`VaultManager`] owns the configured roots, the shared resolution cache,
//! and the lock service, and hands out [`VaultSession`]s. A session holds a
//! single "current" vault at a time.

pub mod config;
pub mod manager;
pub mod records;
pub mod session;

pub use config::{config_dir, DiskMap};
pub use manager::VaultManager;
pub use records::{Description, Lease};
pub use session::VaultSession;
