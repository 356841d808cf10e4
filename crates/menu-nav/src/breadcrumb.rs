//! Breadcrumb trail construction.
//!
//! [`ContainerBuilder`] derives the trail from the current resource or
//! route:
//!
//! ```text
//! Home > prepends... > Collections > item set ancestors... > Item set > Item > Media
//! ```
//!
//! Every segment is optional and controlled by [`BreadcrumbOptions`].
//!
//! # Architecture
//!
//! Segments are pushed onto a [`TrailBuilder`] in root-to-leaf order. Each
//! pushed crumb becomes the insertion point for the next one, and
//! [`TrailBuilder::finish`] folds the chain into a nested tree with a
//! single branch. A segment whose resource cannot be read is skipped; the
//! rest of the trail is still built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::{
    LinkContext, Resource, ResourceId, ResourceKind, ResourceRef, Services, Site,
};
use crate::link::LinkTarget;
use crate::node::{NavNode, data_id, data_label, data_str};
use crate::routes::{
    ROUTE_ITEM_SET, ROUTE_PAGE, ROUTE_RESOURCE, ROUTE_RESOURCE_ID, ROUTE_SITE, ROUTE_TOP,
};

/// Crumb names accepted by [`BreadcrumbOptions::with_crumbs`].
pub const CRUMBS: [&str; 5] = ["home", "collections", "itemset", "itemsetstree", "current"];

/// Static link inserted after Home.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrependLink {
    /// Link target.
    pub uri: String,
    /// Display label.
    pub label: String,
}

/// Options controlling which segments a trail contains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreadcrumbOptions {
    /// Start with a Home crumb.
    pub home: bool,
    /// Add a Collections crumb before resources.
    pub collections: bool,
    /// Custom URL for the Collections crumb; the item set browse page
    /// when empty.
    pub collections_url: String,
    /// Add the item's primary item set.
    pub itemset: bool,
    /// Add item set ancestors from the item set tree.
    pub itemsetstree: bool,
    /// End with the current resource or page.
    pub current: bool,
    /// Build a trail on the site home page too.
    pub homepage: bool,
    /// Separator rendered between crumbs.
    pub separator: String,
    /// Links inserted after Home, each nested under the previous one.
    pub prepend: Vec<PrependLink>,
    /// Property whose linked item set is the primary one.
    pub property_itemset: String,
}

impl Default for BreadcrumbOptions {
    fn default() -> Self {
        Self {
            home: true,
            collections: true,
            collections_url: String::new(),
            itemset: true,
            itemsetstree: true,
            current: true,
            homepage: false,
            separator: String::new(),
            prepend: Vec::new(),
            property_itemset: String::new(),
        }
    }
}

impl BreadcrumbOptions {
    /// Enable exactly the named crumbs; names not listed are disabled.
    #[must_use]
    pub fn with_crumbs<S: AsRef<str>>(mut self, crumbs: &[S]) -> Self {
        self.set_crumbs(crumbs);
        self
    }

    pub(crate) fn set_crumbs<S: AsRef<str>>(&mut self, crumbs: &[S]) {
        let has = |name: &str| crumbs.iter().any(|c| c.as_ref() == name);
        self.home = has("home");
        self.collections = has("collections");
        self.itemset = has("itemset");
        self.itemsetstree = has("itemsetstree");
        self.current = has("current");
    }

    /// Names of the enabled crumbs, in [`CRUMBS`] order.
    #[must_use]
    pub fn crumbs(&self) -> Vec<&'static str> {
        let flags = [
            self.home,
            self.collections,
            self.itemset,
            self.itemsetstree,
            self.current,
        ];
        CRUMBS
            .iter()
            .zip(flags)
            .filter_map(|(name, enabled)| enabled.then_some(*name))
            .collect()
    }
}

/// Matched route of the current request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    /// Route name (e.g. `site/resource`).
    pub name: String,
    /// Route parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    /// Route match without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Non-empty parameter value.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// One breadcrumb page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Crumb {
    /// Display label.
    pub label: String,
    /// Link target, empty when not navigable.
    pub uri: String,
    /// Whether this crumb is the current location.
    pub active: bool,
    /// Resource this crumb stands for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRef>,
    /// Nested crumbs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Crumb>,
}

impl Crumb {
    /// Inactive crumb.
    #[must_use]
    pub fn new(label: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            uri: uri.into(),
            active: false,
            resource: None,
            children: Vec::new(),
        }
    }

    /// Mark active or not.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Crumb without nesting, for custom templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlatCrumb {
    /// Display label.
    pub label: String,
    /// Link target.
    pub uri: String,
    /// Resource this crumb stands for.
    pub resource: Option<ResourceRef>,
}

/// Built breadcrumb trail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BreadcrumbTrail {
    /// Top-level crumbs.
    pub roots: Vec<Crumb>,
}

impl BreadcrumbTrail {
    /// Whether the trail has no crumbs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Root-to-leaf path following the first child at each level.
    #[must_use]
    pub fn path(&self) -> Vec<&Crumb> {
        let mut path = Vec::new();
        let mut next = self.roots.first();
        while let Some(crumb) = next {
            path.push(crumb);
            next = crumb.children.first();
        }
        path
    }

    /// Every crumb in pre-order.
    #[must_use]
    pub fn flat_crumbs(&self) -> Vec<FlatCrumb> {
        fn walk(crumbs: &[Crumb], out: &mut Vec<FlatCrumb>) {
            for crumb in crumbs {
                out.push(FlatCrumb {
                    label: crumb.label.clone(),
                    uri: crumb.uri.clone(),
                    resource: crumb.resource,
                });
                walk(&crumb.children, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }
}

/// Accumulates crumbs in root-to-leaf order.
#[derive(Debug, Default)]
pub struct TrailBuilder {
    chain: Vec<Crumb>,
}

impl TrailBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a crumb below the last one.
    pub fn push(&mut self, crumb: Crumb) {
        self.chain.push(crumb);
    }

    /// Number of crumbs pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether nothing was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Nest the chain into a trail.
    #[must_use]
    pub fn finish(self) -> BreadcrumbTrail {
        let root = self.chain.into_iter().rev().reduce(|child, mut parent| {
            parent.children.push(child);
            parent
        });
        BreadcrumbTrail {
            roots: root.into_iter().collect(),
        }
    }
}

/// Label for a resource listing route.
fn controller_label(controller: &str, action: &str) -> &'static str {
    if action == "search" {
        return "Search";
    }
    match controller {
        "item-set" => "Item sets",
        "item" => "Items",
        "media" => "Media",
        _ => "Browse",
    }
}

/// Builds breadcrumb trails.
#[derive(Clone)]
pub struct ContainerBuilder {
    services: Services,
}

impl ContainerBuilder {
    /// Create a builder.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Build the trail for the current resource, or for the matched route
    /// when there is no resource.
    ///
    /// Returns an empty trail on the site home page unless
    /// `options.homepage` is set.
    #[must_use]
    pub fn build(
        &self,
        site: &Site,
        route: Option<&RouteMatch>,
        resource: Option<&Resource>,
        options: &BreadcrumbOptions,
    ) -> BreadcrumbTrail {
        if !options.homepage
            && route.is_some_and(|route| route.name == ROUTE_SITE || route.name == ROUTE_TOP)
        {
            return BreadcrumbTrail::default();
        }

        let cx = LinkContext::new(site, &self.services);
        let mut trail = TrailBuilder::new();

        if options.home {
            trail.push(Crumb::new("Home", cx.url(&LinkTarget::route(ROUTE_SITE))));
        }
        for link in &options.prepend {
            trail.push(Crumb::new(link.label.as_str(), link.uri.as_str()));
        }

        if let Some(resource) = resource {
            Self::resource_hierarchy(&cx, &mut trail, resource, options);
        } else if let Some(route) = route {
            Self::route_hierarchy(&cx, &mut trail, route, options);
        }

        trail.finish()
    }

    fn resource_hierarchy(
        cx: &LinkContext<'_>,
        trail: &mut TrailBuilder,
        resource: &Resource,
        options: &BreadcrumbOptions,
    ) {
        if options.collections {
            trail.push(Self::collections_crumb(cx, options));
        }

        match resource.kind {
            ResourceKind::Media => {
                let item = resource.item.and_then(|id| cx.resource(id));
                if let Some(item) = &item {
                    if options.itemset || options.itemsetstree {
                        Self::item_set_hierarchy(cx, trail, item, options);
                    }
                    trail.push(Self::resource_crumb(cx, item));
                } else {
                    tracing::debug!(media = resource.id, "Media has no readable item");
                }
            }
            ResourceKind::Item => {
                if options.itemset || options.itemsetstree {
                    Self::item_set_hierarchy(cx, trail, resource, options);
                }
            }
            ResourceKind::ItemSet => {
                if options.itemsetstree {
                    Self::item_set_ancestors(cx, trail, resource.id);
                }
            }
        }

        if options.current {
            trail.push(Self::resource_crumb(cx, resource).active(true));
        }
    }

    /// Primary item set of an item, preceded by its ancestors when the
    /// item set tree is enabled and available.
    fn item_set_hierarchy(
        cx: &LinkContext<'_>,
        trail: &mut TrailBuilder,
        item: &Resource,
        options: &BreadcrumbOptions,
    ) {
        let Some(item_set) = Self::primary_item_set(cx, item, options) else {
            return;
        };

        let tree = &cx.services().item_set_tree;
        if options.itemsetstree && tree.is_available() {
            Self::item_set_ancestors(cx, trail, item_set.id);
        } else if !options.itemset {
            return;
        }
        trail.push(Self::resource_crumb(cx, &item_set));
    }

    fn item_set_ancestors(cx: &LinkContext<'_>, trail: &mut TrailBuilder, item_set: ResourceId) {
        for ancestor in cx.services().item_set_tree.ancestors(item_set) {
            match cx.resource(ancestor) {
                Some(ancestor) => trail.push(Self::resource_crumb(cx, &ancestor)),
                None => tracing::debug!(item_set, ancestor, "Skipping unreadable item set ancestor"),
            }
        }
    }

    /// Item set chosen to represent the item: the first item set linked
    /// through the configured property, else the first item set.
    fn primary_item_set(
        cx: &LinkContext<'_>,
        item: &Resource,
        options: &BreadcrumbOptions,
    ) -> Option<Resource> {
        let read_item_set = |id: &ResourceId| {
            cx.resource(*id)
                .filter(|resource| resource.kind == ResourceKind::ItemSet)
        };

        if !options.property_itemset.is_empty()
            && let Some(item_set) = item
                .values
                .get(&options.property_itemset)
                .and_then(|ids| ids.iter().find_map(read_item_set))
        {
            return Some(item_set);
        }

        item.item_sets.iter().find_map(read_item_set)
    }

    fn route_hierarchy(
        cx: &LinkContext<'_>,
        trail: &mut TrailBuilder,
        route: &RouteMatch,
        options: &BreadcrumbOptions,
    ) {
        match route.name.as_str() {
            ROUTE_RESOURCE => {
                let controller = route.param("controller").unwrap_or("item");
                let action = route.param("action").unwrap_or("browse");

                if options.collections && controller != "item-set" {
                    trail.push(Self::collections_crumb(cx, options));
                }
                if options.current {
                    let uri = cx.url(
                        &LinkTarget::route(ROUTE_RESOURCE)
                            .param("controller", controller)
                            .param("action", action),
                    );
                    trail.push(Crumb::new(controller_label(controller, action), uri).active(true));
                }
            }
            ROUTE_ITEM_SET => {
                if options.collections {
                    trail.push(Self::collections_crumb(cx, options));
                }
                let item_set = route
                    .param("item-set-id")
                    .and_then(|id| id.parse().ok())
                    .and_then(|id| cx.resource(id))
                    .filter(|resource| resource.kind == ResourceKind::ItemSet);
                if options.current
                    && let Some(item_set) = item_set
                {
                    trail.push(Self::resource_crumb(cx, &item_set).active(true));
                }
            }
            ROUTE_PAGE => {
                let Some(slug) = route.param("page-slug") else {
                    return;
                };
                if let Some(path) = Self::navigation_path(cx, &cx.site().navigation, slug) {
                    let last = path.len() - 1;
                    for (i, crumb) in path.into_iter().enumerate() {
                        trail.push(crumb.active(i == last));
                    }
                } else if options.current
                    && let Some(page) = cx.site().page_by_slug(slug)
                {
                    trail.push(Crumb::new(page.title.as_str(), Self::page_url(cx, slug)).active(true));
                }
            }
            _ => {
                if options.current {
                    trail.push(Crumb::new("Current page", "").active(true));
                }
            }
        }
    }

    /// Crumbs from the navigation root down to the page with `slug`.
    fn navigation_path(
        cx: &LinkContext<'_>,
        nodes: &[NavNode],
        slug: &str,
    ) -> Option<Vec<Crumb>> {
        for node in nodes {
            if node.link_type == "page"
                && let Some(page) = data_id(&node.data).and_then(|id| cx.site().page(id))
                && page.slug == slug
            {
                let label = node.label().unwrap_or(&page.title);
                return Some(vec![Crumb::new(label, Self::page_url(cx, &page.slug))]);
            }

            if let Some(mut path) = Self::navigation_path(cx, &node.links, slug) {
                if let Some(crumb) = Self::ancestor_crumb(cx, node) {
                    path.insert(0, crumb);
                }
                return Some(path);
            }
        }
        None
    }

    /// Crumb for a navigation node above the target page, if it has a
    /// label to show.
    fn ancestor_crumb(cx: &LinkContext<'_>, node: &NavNode) -> Option<Crumb> {
        let label = data_label(&node.data);
        match node.link_type.as_str() {
            "page" => {
                let page = data_id(&node.data).and_then(|id| cx.site().page(id))?;
                Some(Crumb::new(
                    label.unwrap_or(&page.title),
                    Self::page_url(cx, &page.slug),
                ))
            }
            "url" => label.map(|label| {
                Crumb::new(label, data_str(&node.data, "url").unwrap_or_default())
            }),
            _ => label.map(|label| Crumb::new(label, "")),
        }
    }

    fn page_url(cx: &LinkContext<'_>, slug: &str) -> String {
        cx.url(&LinkTarget::route(ROUTE_PAGE).param("page-slug", slug))
    }

    fn collections_crumb(cx: &LinkContext<'_>, options: &BreadcrumbOptions) -> Crumb {
        let uri = if options.collections_url.is_empty() {
            cx.url(
                &LinkTarget::route(ROUTE_RESOURCE)
                    .param("controller", "item-set")
                    .param("action", "browse"),
            )
        } else {
            options.collections_url.clone()
        };
        Crumb::new("Collections", uri)
    }

    fn resource_crumb(cx: &LinkContext<'_>, resource: &Resource) -> Crumb {
        let uri = cx.url(
            &LinkTarget::route(ROUTE_RESOURCE_ID)
                .param("controller", resource.kind.controller())
                .param("action", "show")
                .param("id", resource.id.to_string()),
        );
        Crumb {
            resource: Some(resource.reference()),
            ..Crumb::new(resource.display_title(), uri)
        }
    }
}
