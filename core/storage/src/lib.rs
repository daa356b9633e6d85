//! Storage roots and filesystem plumbing for FolderVault.
//!
//! This module provides the root registry that maps storage categories to
//! directories, the resolution cache that remembers where each vault folder
//! lives, and the small set of filesystem helpers the vault session uses.
//!
//! # Design Principles
//! - Roots are configured once and replaced wholesale, never merged
//! - Placement picks the first preferred category that is configured,
//!   falling back to the mandatory DEFAULT root
//! - The cache is an optimization only; a hit is trusted without re-probing

pub mod cache;
pub mod local;
pub mod registry;

pub use cache::ResolutionCache;
pub use registry::RootRegistry;
