//! Root registry for storage placement.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use foldervault_common::{Category, Error, Result};

/// Registry of storage roots, keyed by category.
///
/// Entries keep their configuration order, which is the order `locate`
/// scans roots in.
#[derive(Debug, Clone, Default)]
pub struct RootRegistry {
    roots: Vec<(Category, PathBuf)>,
}

impl RootRegistry {
    /// Create a new empty (unconfigured) registry.
    pub fn new() -> Self {
        Self { roots: Vec::new() }
    }

    /// Create a registry already configured with `mapping`.
    ///
    /// # Errors
    /// - Same as [`RootRegistry::configure`]
    pub fn from_roots<I, P>(mapping: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Category, P)>,
        P: Into<PathBuf>,
    {
        let mut registry = Self::new();
        registry.configure(mapping)?;
        Ok(registry)
    }

    /// Replace the whole category table.
    ///
    /// # Preconditions
    /// - `mapping` contains a DEFAULT entry
    /// - No category appears twice
    ///
    /// # Postconditions
    /// - Previous entries are gone; the registry holds exactly `mapping`
    /// - Nothing else (e.g. a resolution cache) is invalidated
    ///
    /// # Errors
    /// - `Configuration` if DEFAULT is missing or a category is duplicated;
    ///   the registry is left unchanged
    pub fn configure<I, P>(&mut self, mapping: I) -> Result<()>
    where
        I: IntoIterator<Item = (Category, P)>,
        P: Into<PathBuf>,
    {
        let mut roots: Vec<(Category, PathBuf)> = Vec::new();
        for (category, path) in mapping {
            if roots.iter().any(|(existing, _)| *existing == category) {
                return Err(Error::Configuration(format!(
                    "Category '{}' is configured more than once",
                    category
                )));
            }
            roots.push((category, path.into()));
        }

        if !roots.iter().any(|(category, _)| category.is_default()) {
            return Err(Error::Configuration(
                "required: a DEFAULT root mapping".to_string(),
            ));
        }

        info!("Configured {} storage roots", roots.len());
        self.roots = roots;
        Ok(())
    }

    /// Forget every root. `configure` must be called again before placement.
    pub fn reset(&mut self) {
        self.roots.clear();
    }

    /// Look up the root directory for a category.
    pub fn lookup(&self, category: &Category) -> Option<&Path> {
        self.roots
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, path)| path.as_path())
    }

    /// The mandatory DEFAULT root.
    ///
    /// # Errors
    /// - `Configuration` if the registry has not been configured
    pub fn default_root(&self) -> Result<&Path> {
        self.lookup(&Category::Default).ok_or_else(|| {
            Error::Configuration("required: a DEFAULT root mapping".to_string())
        })
    }

    /// Choose the root a new vault folder should be placed under.
    ///
    /// Walks `priority` in order and returns the first category that has a
    /// root. If none does (including an empty list) the DEFAULT root is used.
    ///
    /// # Errors
    /// - `Configuration` if no category matched and there is no DEFAULT root
    pub fn select(&self, priority: &[Category]) -> Result<(Category, &Path)> {
        for category in priority {
            if let Some(root) = self.lookup(category) {
                debug!("Placement matched category {}", category);
                return Ok((category.clone(), root));
            }
            debug!("Category {} has no root, trying next", category);
        }

        let root = self.default_root()?;
        debug!("Placement fell back to DEFAULT");
        Ok((Category::Default, root))
    }

    /// Iterate over roots in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Category, &Path)> {
        self.roots.iter().map(|(c, p)| (c, p.as_path()))
    }

    /// Configured categories in configuration order.
    pub fn categories(&self) -> Vec<&Category> {
        self.roots.iter().map(|(c, _)| c).collect()
    }

    /// Number of configured roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if no roots are configured.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
