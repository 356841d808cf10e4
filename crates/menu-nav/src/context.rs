//! Site data and collaborator interfaces.
//!
//! Navigation never owns resources or routing. It reads them through
//! three collaborators bundled in [`Services`]:
//! - [`ResourceApi`] - read a resource by id, `None` when it does not exist
//! - [`UrlGenerator`] - assemble a route name and parameters into a path
//! - [`ItemSetTree`] - ancestry of item sets, when the host tracks one
//!
//! A [`LinkContext`] is created for every top-level call and memoizes
//! resource reads and URLs for that call only. Nothing is cached across
//! calls, so a long-lived server never serves stale titles.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use menu_settings::SiteId;
use serde::{Deserialize, Serialize};

use crate::link::LinkTarget;
use crate::node::NavNode;
use crate::routes::PARAM_SITE_SLUG;

/// Identifier of a resource (item, item set or media).
pub type ResourceId = u64;

/// Identifier of a site page.
pub type PageId = u64;

/// Kind of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Item.
    Item,
    /// Item set (collection).
    ItemSet,
    /// Media attached to an item.
    Media,
}

impl ResourceKind {
    /// Controller name used in public routes.
    #[must_use]
    pub fn controller(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::ItemSet => "item-set",
            Self::Media => "media",
        }
    }
}

/// Resource as returned by a [`ResourceApi`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource id.
    pub id: ResourceId,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Title, may be empty.
    #[serde(default)]
    pub title: String,
    /// Public visibility.
    #[serde(default = "default_true")]
    pub is_public: bool,
    /// Item sets an item belongs to, in stored order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_sets: Vec<ResourceId>,
    /// Parent item of a media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ResourceId>,
    /// Linked resources by property term (e.g. `dcterms:isPartOf`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Vec<ResourceId>>,
}

fn default_true() -> bool {
    true
}

impl Resource {
    /// Create a resource with a title and no relations.
    #[must_use]
    pub fn new(id: ResourceId, kind: ResourceKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            is_public: true,
            item_sets: Vec::new(),
            item: None,
            values: BTreeMap::new(),
        }
    }

    /// Title for display, `[Untitled]` when empty.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "[Untitled]"
        } else {
            &self.title
        }
    }

    /// Opaque handle for breadcrumb pages.
    #[must_use]
    pub fn reference(&self) -> ResourceRef {
        ResourceRef {
            id: self.id,
            kind: self.kind,
        }
    }
}

/// Reference to a resource carried by breadcrumb pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    /// Resource id.
    pub id: ResourceId,
    /// Resource kind.
    pub kind: ResourceKind,
}

/// Static page of a site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePage {
    /// Page id, referenced by `page` links.
    pub id: PageId,
    /// URL slug.
    pub slug: String,
    /// Page title.
    pub title: String,
    /// Public visibility.
    #[serde(default = "default_true")]
    pub is_public: bool,
}

/// Site with its pages and own navigation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Site id, the settings scope.
    pub id: SiteId,
    /// URL slug.
    pub slug: String,
    /// Site title.
    #[serde(default)]
    pub title: String,
    /// Static pages.
    #[serde(default)]
    pub pages: Vec<SitePage>,
    /// The site's own top-level navigation.
    #[serde(default)]
    pub navigation: Vec<NavNode>,
}

impl Site {
    /// Create a site without pages or navigation.
    #[must_use]
    pub fn new(id: SiteId, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            title: String::new(),
            pages: Vec::new(),
            navigation: Vec::new(),
        }
    }

    /// Page by id.
    #[must_use]
    pub fn page(&self, id: PageId) -> Option<&SitePage> {
        self.pages.iter().find(|page| page.id == id)
    }

    /// Page by slug.
    #[must_use]
    pub fn page_by_slug(&self, slug: &str) -> Option<&SitePage> {
        self.pages.iter().find(|page| page.slug == slug)
    }
}

/// Read access to resources.
pub trait ResourceApi: Send + Sync {
    /// Read a resource. `None` means it does not exist or is not readable.
    fn read(&self, id: ResourceId) -> Option<Resource>;
}

/// Assembles routes into URL paths.
pub trait UrlGenerator: Send + Sync {
    /// Build a path for `route`. Returns `None` for unknown routes.
    fn assemble(
        &self,
        route: &str,
        params: &BTreeMap<String, String>,
        query: &BTreeMap<String, String>,
    ) -> Option<String>;
}

/// Hierarchy of item sets.
pub trait ItemSetTree: Send + Sync {
    /// Whether the hierarchy is maintained at all.
    fn is_available(&self) -> bool;

    /// Ancestors of an item set, root first, excluding the set itself.
    fn ancestors(&self, item_set: ResourceId) -> Vec<ResourceId>;
}

/// Item set tree for hosts without a hierarchy.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoItemSetTree;

impl ItemSetTree for NoItemSetTree {
    fn is_available(&self) -> bool {
        false
    }

    fn ancestors(&self, _item_set: ResourceId) -> Vec<ResourceId> {
        Vec::new()
    }
}

/// Collaborators shared by the translator and the breadcrumb builder.
#[derive(Clone)]
pub struct Services {
    /// Resource reads.
    pub resources: Arc<dyn ResourceApi>,
    /// URL assembly.
    pub urls: Arc<dyn UrlGenerator>,
    /// Item set ancestry.
    pub item_set_tree: Arc<dyn ItemSetTree>,
}

impl Services {
    /// Services without an item set tree.
    #[must_use]
    pub fn new(resources: Arc<dyn ResourceApi>, urls: Arc<dyn UrlGenerator>) -> Self {
        Self {
            resources,
            urls,
            item_set_tree: Arc::new(NoItemSetTree),
        }
    }

    /// Use an item set tree.
    #[must_use]
    pub fn with_item_set_tree(mut self, tree: Arc<dyn ItemSetTree>) -> Self {
        self.item_set_tree = tree;
        self
    }
}

/// Per-call resolution context handed to link types.
pub struct LinkContext<'a> {
    site: &'a Site,
    services: &'a Services,
    resources: RefCell<HashMap<ResourceId, Option<Resource>>>,
    urls: RefCell<HashMap<String, String>>,
}

impl<'a> LinkContext<'a> {
    /// Fresh context with empty caches.
    #[must_use]
    pub fn new(site: &'a Site, services: &'a Services) -> Self {
        Self {
            site,
            services,
            resources: RefCell::new(HashMap::new()),
            urls: RefCell::new(HashMap::new()),
        }
    }

    /// Current site.
    #[must_use]
    pub fn site(&self) -> &'a Site {
        self.site
    }

    /// Collaborators.
    #[must_use]
    pub fn services(&self) -> &'a Services {
        self.services
    }

    /// Read a resource, at most once per id for this context.
    ///
    /// Id `0` never exists.
    #[must_use]
    pub fn resource(&self, id: ResourceId) -> Option<Resource> {
        if id == 0 {
            return None;
        }
        self.resources
            .borrow_mut()
            .entry(id)
            .or_insert_with(|| {
                let resource = self.services.resources.read(id);
                if resource.is_none() {
                    tracing::debug!(id, site = %self.site.slug, "Navigation references missing resource");
                }
                resource
            })
            .clone()
    }

    /// Resolve a target to a URL string.
    ///
    /// Route targets get the current `site-slug`. Unknown routes resolve to
    /// an empty string.
    #[must_use]
    pub fn url(&self, target: &LinkTarget) -> String {
        match target {
            LinkTarget::Uri(uri) => uri.clone(),
            LinkTarget::Route {
                name,
                params,
                query,
            } => {
                let mut params = params.clone();
                params.insert(PARAM_SITE_SLUG.to_owned(), self.site.slug.clone());
                self.services
                    .urls
                    .assemble(name, &params, query)
                    .unwrap_or_else(|| {
                        tracing::debug!(route = %name, "No URL for route");
                        String::new()
                    })
            }
        }
    }

    /// Memoized URL lookup keyed by a caller-chosen serialization.
    pub(crate) fn cached_url(&self, key: String, resolve: impl FnOnce() -> String) -> String {
        if let Some(url) = self.urls.borrow().get(&key) {
            return url.clone();
        }
        let url = resolve();
        self.urls.borrow_mut().insert(key, url.clone());
        url
    }
}
