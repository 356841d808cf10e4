//! In-memory sites and resources.
//!
//! [`MemoryCatalog`] backs the server and CLI with a JSON fixture and
//! serves as the [`ResourceApi`] and [`ItemSetTree`] in tests.
//!
//! ```json
//! {
//!   "sites": [{"id": 1, "slug": "demo", "pages": [{"id": 1, "slug": "about", "title": "About"}]}],
//!   "resources": [{"id": 5, "kind": "item-set", "title": "Maps"}],
//!   "item_set_parents": {"6": 5}
//! }
//! ```
//!
//! `item_set_parents` is optional. Without it the item set tree is
//! reported unavailable.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use menu_settings::SiteId;
use serde::{Deserialize, Serialize};

use crate::context::{ItemSetTree, Resource, ResourceApi, ResourceId, Site};

/// Error loading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// File could not be read.
    #[error("Failed to read catalog {}: {source}", path.display())]
    Io {
        /// Catalog path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// File is not a valid catalog.
    #[error("Invalid catalog {}: {source}", path.display())]
    Parse {
        /// Catalog path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Sites, resources and item set parents held in memory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryCatalog {
    /// Sites.
    #[serde(default)]
    pub sites: Vec<Site>,
    /// Resources of all sites.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Parent of each item set, when the hierarchy is maintained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_set_parents: Option<BTreeMap<ResourceId, ResourceId>>,
}

impl MemoryCatalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Self =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            path = %path.display(),
            sites = catalog.sites.len(),
            resources = catalog.resources.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Add a site.
    #[must_use]
    pub fn with_site(mut self, site: Site) -> Self {
        self.sites.push(site);
        self
    }

    /// Add a resource.
    #[must_use]
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Record an item set's parent, enabling the item set tree.
    #[must_use]
    pub fn with_item_set_parent(mut self, item_set: ResourceId, parent: ResourceId) -> Self {
        self.item_set_parents
            .get_or_insert_with(BTreeMap::new)
            .insert(item_set, parent);
        self
    }

    /// Site by id.
    #[must_use]
    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.iter().find(|site| site.id == id)
    }

    /// Site by slug.
    #[must_use]
    pub fn site_by_slug(&self, slug: &str) -> Option<&Site> {
        self.sites.iter().find(|site| site.slug == slug)
    }
}

impl ResourceApi for MemoryCatalog {
    fn read(&self, id: ResourceId) -> Option<Resource> {
        self.resources
            .iter()
            .find(|resource| resource.id == id)
            .cloned()
    }
}

impl ItemSetTree for MemoryCatalog {
    fn is_available(&self) -> bool {
        self.item_set_parents.is_some()
    }

    fn ancestors(&self, item_set: ResourceId) -> Vec<ResourceId> {
        let Some(parents) = &self.item_set_parents else {
            return Vec::new();
        };

        let mut seen = HashSet::from([item_set]);
        let mut ancestors = Vec::new();
        let mut current = item_set;
        while let Some(&parent) = parents.get(&current) {
            if !seen.insert(parent) {
                tracing::warn!(item_set, parent, "Cycle in item set tree");
                break;
            }
            ancestors.push(parent);
            current = parent;
        }
        ancestors.reverse();
        ancestors
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::context::ResourceKind;

    #[test]
    fn test_read_resource() {
        let catalog = MemoryCatalog::new()
            .with_resource(Resource::new(5, ResourceKind::ItemSet, "Maps"));

        assert_eq!(catalog.read(5).map(|r| r.title), Some("Maps".to_owned()));
        assert_eq!(catalog.read(6), None);
    }

    #[test]
    fn test_ancestors_root_first() {
        let catalog = MemoryCatalog::new()
            .with_item_set_parent(3, 2)
            .with_item_set_parent(2, 1);

        assert!(catalog.is_available());
        assert_eq!(catalog.ancestors(3), vec![1, 2]);
        assert_eq!(catalog.ancestors(1), Vec::<ResourceId>::new());
    }

    #[test]
    fn test_ancestors_stop_at_cycle() {
        let catalog = MemoryCatalog::new()
            .with_item_set_parent(1, 2)
            .with_item_set_parent(2, 1);

        assert_eq!(catalog.ancestors(1), vec![2]);
    }

    #[test]
    fn test_tree_unavailable_without_parents() {
        let catalog = MemoryCatalog::new();

        assert!(!catalog.is_available());
        assert!(catalog.ancestors(1).is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "sites": [{{"id": 1, "slug": "demo", "pages": [{{"id": 3, "slug": "about", "title": "About"}}]}}],
                "resources": [{{"id": 5, "kind": "item-set", "title": "Maps"}}],
                "item_set_parents": {{"6": 5}}
            }}"#
        )
        .unwrap();

        let catalog = MemoryCatalog::from_json_file(file.path()).unwrap();

        let site = catalog.site_by_slug("demo").unwrap();
        assert_eq!(site.id, 1);
        assert_eq!(site.page_by_slug("about").map(|p| p.id), Some(3));
        assert!(catalog.site(2).is_none());
        assert_eq!(catalog.read(5).map(|r| r.kind), Some(ResourceKind::ItemSet));
        assert_eq!(catalog.ancestors(6), vec![5]);
    }

    #[test]
    fn test_from_json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let invalid = dir.path().join("invalid.json");
        std::fs::write(&invalid, "{not json").unwrap();

        assert!(matches!(
            MemoryCatalog::from_json_file(&missing),
            Err(CatalogError::Io { .. })
        ));
        assert!(matches!(
            MemoryCatalog::from_json_file(&invalid),
            Err(CatalogError::Parse { .. })
        ));
    }
}
