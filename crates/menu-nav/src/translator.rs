//! Conversion between the three navigation tree shapes.
//!
//! [`NavigationTranslator`] turns stored [`NavNode`] trees into editor
//! trees and render-ready pages, and editor trees back into stored nodes.
//! Labels, URLs and active flags are resolved through the
//! [`LinkTypeRegistry`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use menu_nav::{ActiveSelector, DefaultRoutes, LinkTypeRegistry, MemoryCatalog,
//!     NavNode, NavigationTranslator, Services, Site};
//! use serde_json::json;
//!
//! let services = Services::new(Arc::new(MemoryCatalog::new()), Arc::new(DefaultRoutes::new()));
//! let translator = NavigationTranslator::new(Arc::new(LinkTypeRegistry::with_defaults()), services);
//! let site = Site::new(1, "demo");
//!
//! let nodes: Vec<NavNode> = serde_json::from_value(json!([
//!     {"type": "url", "data": {"url": "/s/demo/about", "label": "About"}, "links": []}
//! ])).unwrap();
//!
//! let pages = translator
//!     .to_navigation(&site, &nodes, &ActiveSelector::Url("/s/demo/about".to_owned()))
//!     .unwrap();
//! assert_eq!(pages[0].label, "About");
//! assert_eq!(pages[0].active, Some(true));
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::context::{LinkContext, Services, Site};
use crate::error::{FieldError, TranslateError};
use crate::link::{LinkTarget, LinkType, LinkTypeRegistry};
use crate::node::{EditorNode, EditorNodeData, LinkData, NavNode, NavPage};
use crate::routes::ROUTE_SITE;

/// How active pages are chosen when building render-ready pages.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ActiveSelector {
    /// Leave `active` unset; the renderer matches the request path itself.
    #[default]
    Framework,
    /// Compare each page's URL with the given current request path.
    Current(String),
    /// Mark every page inactive.
    Inactive,
    /// Match pages whose URL equals this string.
    Url(String),
    /// Match pages of this type whose data agrees on all common keys.
    Link {
        /// Link type discriminator.
        link_type: String,
        /// Partial link data.
        data: LinkData,
    },
}

/// Translator for navigation trees.
#[derive(Clone)]
pub struct NavigationTranslator {
    links: Arc<LinkTypeRegistry>,
    services: Services,
}

impl NavigationTranslator {
    /// Create a translator.
    #[must_use]
    pub fn new(links: Arc<LinkTypeRegistry>, services: Services) -> Self {
        Self { links, services }
    }

    /// Registered link types.
    #[must_use]
    pub fn links(&self) -> &LinkTypeRegistry {
        &self.links
    }

    /// Collaborators.
    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Build the tree editor view of `nodes`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::UnknownLinkType`] if any node names a link
    /// type that is not registered.
    pub fn to_editor_tree(
        &self,
        site: &Site,
        nodes: &[NavNode],
    ) -> Result<Vec<EditorNode>, TranslateError> {
        let cx = LinkContext::new(site, &self.services);
        self.editor_nodes(&cx, nodes)
    }

    fn editor_nodes(
        &self,
        cx: &LinkContext<'_>,
        nodes: &[NavNode],
    ) -> Result<Vec<EditorNode>, TranslateError> {
        nodes
            .iter()
            .map(|node| {
                let link_type = self.links.get(&node.link_type)?;
                let payload = link_type.editor_payload(&node.data, cx);
                Ok(EditorNode {
                    text: Self::resolve_label(link_type, &node.data, cx),
                    data: EditorNodeData {
                        link_type: node.link_type.clone(),
                        data: node.data.clone(),
                        url: Self::resolve_url(link_type, node, cx),
                        is_public: payload.is_public,
                        remove: false,
                        details: payload.details,
                    },
                    children: self.editor_nodes(cx, &node.links)?,
                })
            })
            .collect()
    }

    /// Translate an editor tree back to stored nodes.
    ///
    /// Nodes marked for removal are dropped with their whole subtree.
    /// Presentation fields are discarded.
    #[must_use]
    pub fn from_editor_tree(nodes: &[EditorNode]) -> Vec<NavNode> {
        nodes
            .iter()
            .filter(|node| !node.data.remove)
            .map(|node| NavNode {
                link_type: node.data.link_type.clone(),
                data: node.data.data.clone(),
                links: Self::from_editor_tree(&node.children),
            })
            .collect()
    }

    /// Check every node against its link type.
    ///
    /// Field paths look like `tree[0].links[2].id`.
    #[must_use]
    pub fn validate(&self, nodes: &[NavNode]) -> Vec<FieldError> {
        let mut errors = Vec::new();
        self.validate_into(nodes, "tree", &mut errors);
        errors
    }

    fn validate_into(&self, nodes: &[NavNode], prefix: &str, errors: &mut Vec<FieldError>) {
        for (i, node) in nodes.iter().enumerate() {
            let location = format!("{prefix}[{i}]");
            match self.links.get(&node.link_type) {
                Ok(link_type) => {
                    if let Err(e) = link_type.validate(&node.data) {
                        errors.push(e.at(&location));
                    }
                }
                Err(e) => errors.push(FieldError::new("type", e.to_string()).at(&location)),
            }
            self.validate_into(&node.links, &format!("{location}.links"), errors);
        }
    }

    /// Build render-ready pages for `nodes`.
    ///
    /// Each node's active flag is decided on its own: an active ancestor and
    /// an active descendant can both be marked.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::UnknownLinkType`] if any node names a link
    /// type that is not registered.
    pub fn to_navigation(
        &self,
        site: &Site,
        nodes: &[NavNode],
        active: &ActiveSelector,
    ) -> Result<Vec<NavPage>, TranslateError> {
        let cx = LinkContext::new(site, &self.services);
        self.nav_pages(&cx, nodes, active)
    }

    /// Build render-ready pages for the site's own navigation.
    ///
    /// A site without navigation gets a single Home page.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::UnknownLinkType`] if the site navigation
    /// names a link type that is not registered.
    pub fn site_navigation(
        &self,
        site: &Site,
        active: &ActiveSelector,
    ) -> Result<Vec<NavPage>, TranslateError> {
        let cx = LinkContext::new(site, &self.services);
        let pages = self.nav_pages(&cx, &site.navigation, active)?;
        if !pages.is_empty() {
            return Ok(pages);
        }

        let target = LinkTarget::route(ROUTE_SITE);
        let href = cx.url(&target);
        let is_active = match active {
            ActiveSelector::Inactive => Some(false),
            ActiveSelector::Url(url) | ActiveSelector::Current(url) => {
                (href == *url).then_some(true)
            }
            ActiveSelector::Framework | ActiveSelector::Link { .. } => None,
        };
        Ok(vec![NavPage {
            label: "Home".to_owned(),
            target,
            href,
            class: None,
            visible: true,
            active: is_active,
            pages: Vec::new(),
        }])
    }

    fn nav_pages(
        &self,
        cx: &LinkContext<'_>,
        nodes: &[NavNode],
        active: &ActiveSelector,
    ) -> Result<Vec<NavPage>, TranslateError> {
        nodes
            .iter()
            .map(|node| {
                let link_type = self.links.get(&node.link_type)?;
                let resolved = link_type.target(&node.data, cx);
                let href = Self::resolve_url(link_type, node, cx);
                let is_active = match active {
                    ActiveSelector::Framework => None,
                    ActiveSelector::Inactive => Some(false),
                    ActiveSelector::Url(url) | ActiveSelector::Current(url) => {
                        (href == *url).then_some(true)
                    }
                    ActiveSelector::Link { link_type, data } => (node.link_type == *link_type
                        && !node.data.contains_key("uri")
                        && common_keys_equal(&node.data, data))
                    .then_some(true),
                };
                Ok(NavPage {
                    label: Self::resolve_label(link_type, &node.data, cx),
                    target: resolved.target,
                    href,
                    class: resolved.class,
                    visible: resolved.visible,
                    active: is_active,
                    pages: self.nav_pages(cx, &node.links, active)?,
                })
            })
            .collect()
    }

    /// Label of a node: its link type's label, else the link type's name.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::UnknownLinkType`] for unregistered types.
    pub fn link_label(&self, site: &Site, node: &NavNode) -> Result<String, TranslateError> {
        let link_type = self.links.get(&node.link_type)?;
        let cx = LinkContext::new(site, &self.services);
        Ok(Self::resolve_label(link_type, &node.data, &cx))
    }

    /// URL of a node, empty when it is not navigable.
    ///
    /// An explicit `uri` in the node data is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::UnknownLinkType`] for unregistered types.
    pub fn link_url(&self, site: &Site, node: &NavNode) -> Result<String, TranslateError> {
        let link_type = self.links.get(&node.link_type)?;
        let cx = LinkContext::new(site, &self.services);
        Ok(Self::resolve_url(link_type, node, &cx))
    }

    fn resolve_label(link_type: &dyn LinkType, data: &LinkData, cx: &LinkContext<'_>) -> String {
        link_type
            .label(data, cx)
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| link_type.name().to_owned())
    }

    fn resolve_url(link_type: &dyn LinkType, node: &NavNode, cx: &LinkContext<'_>) -> String {
        if let Some(uri) = node.data.get("uri") {
            return match uri {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
        }

        let resolve = || cx.url(&link_type.target(&node.data, cx).target);
        match serde_json::to_string(&(&node.link_type, &node.data)) {
            Ok(key) => cx.cached_url(key, resolve),
            Err(_) => resolve(),
        }
    }
}

/// Compare two payloads on the keys they share. Keys present on only one
/// side are ignored.
fn common_keys_equal(a: &LinkData, b: &LinkData) -> bool {
    a.iter()
        .all(|(key, value)| b.get(key).is_none_or(|other| other == value))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::context::{Resource, ResourceApi, ResourceId, ResourceKind, SitePage};
    use crate::routes::DefaultRoutes;

    #[derive(Default)]
    struct Catalog {
        reads: AtomicUsize,
    }

    impl ResourceApi for Catalog {
        fn read(&self, id: ResourceId) -> Option<Resource> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match id {
                5 => Some(Resource::new(5, ResourceKind::Item, "Old map")),
                6 => Some(Resource::new(6, ResourceKind::Item, "New map")),
                _ => None,
            }
        }
    }

    fn translator_with(catalog: Arc<Catalog>) -> NavigationTranslator {
        NavigationTranslator::new(
            Arc::new(LinkTypeRegistry::with_defaults()),
            Services::new(catalog, Arc::new(DefaultRoutes::new())),
        )
    }

    fn translator() -> NavigationTranslator {
        translator_with(Arc::new(Catalog::default()))
    }

    fn site() -> Site {
        let mut site = Site::new(1, "demo");
        site.pages.push(SitePage {
            id: 3,
            slug: "about".to_owned(),
            title: "About".to_owned(),
            is_public: true,
        });
        site
    }

    fn nodes(value: Value) -> Vec<NavNode> {
        serde_json::from_value(value).unwrap()
    }

    fn sample_tree() -> Vec<NavNode> {
        nodes(json!([
            {"type": "page", "data": {"id": 3, "label": ""}, "links": [
                {"type": "resource", "data": {"id": 5, "label": "X"}, "links": []},
                {"type": "url", "data": {"url": "https://example.org", "label": "Ext"}, "links": []}
            ]},
            {"type": "structure", "data": {"label": "Group", "class": "group"}, "links": [
                {"type": "resource", "data": {"id": 99}, "links": []}
            ]}
        ]))
    }

    #[test]
    fn test_editor_tree_round_trip_is_exact() {
        let translator = translator();
        let tree = sample_tree();

        let editor = translator.to_editor_tree(&site(), &tree).unwrap();
        let back = NavigationTranslator::from_editor_tree(&editor);

        assert_eq!(back, tree);
    }

    #[test]
    fn test_editor_tree_round_trip_through_json() {
        let translator = translator();
        let tree = sample_tree();

        let editor = translator.to_editor_tree(&site(), &tree).unwrap();
        let json = serde_json::to_string(&editor).unwrap();
        let parsed: Vec<EditorNode> = serde_json::from_str(&json).unwrap();

        assert_eq!(NavigationTranslator::from_editor_tree(&parsed), tree);
    }

    #[test]
    fn test_editor_tree_resolves_labels_and_urls() {
        let editor = translator().to_editor_tree(&site(), &sample_tree()).unwrap();

        assert_eq!(editor[0].text, "About");
        assert_eq!(editor[0].data.url, "/s/demo/page/about");
        assert_eq!(editor[0].children[0].text, "X");
        assert_eq!(editor[0].children[0].data.url, "/s/demo/item/5");
        assert_eq!(editor[0].children[1].data.url, "https://example.org");
        assert_eq!(editor[1].text, "Group");
        assert_eq!(editor[1].data.url, "");
        assert_eq!(editor[1].children[0].text, "[Unknown resource #99]");
        assert_eq!(editor[1].children[0].data.url, "");
    }

    #[test]
    fn test_from_editor_tree_drops_removed_subtree() {
        let editor: Vec<EditorNode> = serde_json::from_value(json!([
            {"text": "Keep", "data": {"type": "url", "data": {"url": "/a"}}, "children": []},
            {"text": "Drop", "data": {"type": "structure", "data": {}, "remove": true}, "children": [
                {"text": "Child", "data": {"type": "url", "data": {"url": "/b"}}, "children": []}
            ]}
        ]))
        .unwrap();

        let stored = NavigationTranslator::from_editor_tree(&editor);

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].data.get("url"), Some(&json!("/a")));
    }

    #[test]
    fn test_unknown_link_type_is_an_error() {
        let tree = nodes(json!([{"type": "browse", "data": {}, "links": []}]));

        let err = translator().to_editor_tree(&site(), &tree).unwrap_err();

        assert_eq!(err.to_string(), "Unknown link type: browse");
    }

    #[test]
    fn test_unknown_link_type_nested_is_an_error() {
        let tree = nodes(json!([
            {"type": "url", "data": {"url": "/a"}, "links": [{"type": "mystery", "data": {}}]}
        ]));

        assert!(
            translator()
                .to_navigation(&site(), &tree, &ActiveSelector::Framework)
                .is_err()
        );
    }

    #[test]
    fn test_active_link_selector_ignores_extra_keys() {
        let tree = nodes(json!([{"type": "resource", "data": {"id": 5, "label": "X"}}]));
        let selector = |id: u64| ActiveSelector::Link {
            link_type: "resource".to_owned(),
            data: json!({"id": id}).as_object().cloned().unwrap(),
        };

        let matched = translator().to_navigation(&site(), &tree, &selector(5)).unwrap();
        let missed = translator().to_navigation(&site(), &tree, &selector(6)).unwrap();

        assert_eq!(matched[0].active, Some(true));
        assert_eq!(missed[0].active, None);
    }

    #[test]
    fn test_active_link_selector_requires_same_type() {
        let tree = nodes(json!([{"type": "page", "data": {"id": 5}}]));
        let selector = ActiveSelector::Link {
            link_type: "resource".to_owned(),
            data: json!({"id": 5}).as_object().cloned().unwrap(),
        };

        let pages = translator().to_navigation(&site(), &tree, &selector).unwrap();

        assert_eq!(pages[0].active, None);
    }

    #[test]
    fn test_active_url_marks_ancestor_and_descendant_independently() {
        let tree = nodes(json!([
            {"type": "url", "data": {"url": "/same"}, "links": [
                {"type": "url", "data": {"url": "/same"}},
                {"type": "url", "data": {"url": "/other"}}
            ]}
        ]));

        let pages = translator()
            .to_navigation(&site(), &tree, &ActiveSelector::Url("/same".to_owned()))
            .unwrap();

        assert_eq!(pages[0].active, Some(true));
        assert_eq!(pages[0].pages[0].active, Some(true));
        assert_eq!(pages[0].pages[1].active, None);
    }

    #[test]
    fn test_active_inactive_forces_false() {
        let pages = translator()
            .to_navigation(&site(), &sample_tree(), &ActiveSelector::Inactive)
            .unwrap();

        assert!(pages.iter().all(|page| page.active == Some(false)));
        assert!(pages[0].pages.iter().all(|page| page.active == Some(false)));
    }

    #[test]
    fn test_active_current_compares_request_path() {
        let pages = translator()
            .to_navigation(
                &site(),
                &sample_tree(),
                &ActiveSelector::Current("/s/demo/page/about".to_owned()),
            )
            .unwrap();

        assert_eq!(pages[0].active, Some(true));
        assert_eq!(pages[1].active, None);
    }

    #[test]
    fn test_dangling_resource_is_hidden_in_navigation() {
        let pages = translator()
            .to_navigation(&site(), &sample_tree(), &ActiveSelector::Framework)
            .unwrap();

        let dangling = &pages[1].pages[0];
        assert_eq!(dangling.label, "[Unknown resource #99]");
        assert_eq!(dangling.href, "");
        assert!(!dangling.visible);
        assert_eq!(pages[0].pages[0].class.as_deref(), Some("resource item"));
    }

    #[test]
    fn test_site_navigation_falls_back_to_home() {
        let pages = translator()
            .site_navigation(&site(), &ActiveSelector::Framework)
            .unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].label, "Home");
        assert_eq!(pages[0].href, "/s/demo");
    }

    #[test]
    fn test_site_navigation_uses_site_tree() {
        let mut site = site();
        site.navigation = sample_tree();

        let pages = translator()
            .site_navigation(&site, &ActiveSelector::Framework)
            .unwrap();

        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_empty_menu_has_no_fallback() {
        let pages = translator()
            .to_navigation(&site(), &[], &ActiveSelector::Framework)
            .unwrap();

        assert!(pages.is_empty());
    }

    #[test]
    fn test_link_label_falls_back_to_type_name() {
        let node = nodes(json!([{"type": "url", "data": {"url": "/a"}}])).remove(0);

        assert_eq!(translator().link_label(&site(), &node).unwrap(), "Custom URL");
    }

    #[test]
    fn test_link_url_prefers_explicit_uri() {
        let node = nodes(json!([{"type": "resource", "data": {"id": 5, "uri": "/custom"}}])).remove(0);

        assert_eq!(translator().link_url(&site(), &node).unwrap(), "/custom");
    }

    #[test]
    fn test_resource_fetches_are_shared_within_one_call() {
        let catalog = Arc::new(Catalog::default());
        let translator = translator_with(Arc::clone(&catalog));
        let tree = nodes(json!([
            {"type": "resource", "data": {"id": 5}},
            {"type": "resource", "data": {"id": 5, "label": "Again"}},
            {"type": "resource", "data": {"id": 6}}
        ]));

        translator.to_editor_tree(&site(), &tree).unwrap();
        assert_eq!(catalog.reads.load(Ordering::SeqCst), 2);

        translator.to_editor_tree(&site(), &tree).unwrap();
        assert_eq!(catalog.reads.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_validate_reports_paths() {
        let tree = nodes(json!([
            {"type": "url", "data": {"url": "/a"}, "links": [
                {"type": "resource", "data": {"label": "No id"}}
            ]},
            {"type": "mystery", "data": {}}
        ]));

        let errors = translator().validate(&tree);

        assert_eq!(
            errors,
            vec![
                FieldError::new("tree[0].links[0].id", "Resource link requires a resource ID"),
                FieldError::new("tree[1].type", "Unknown link type: mystery"),
            ]
        );
    }

    #[test]
    fn test_common_keys_equal_is_symmetric() {
        let a = json!({"id": 5, "label": "X"}).as_object().cloned().unwrap();
        let b = json!({"id": 5, "extra": true}).as_object().cloned().unwrap();
        let c = json!({"id": "5"}).as_object().cloned().unwrap();

        assert!(common_keys_equal(&a, &b));
        assert!(common_keys_equal(&b, &a));
        assert!(!common_keys_equal(&a, &c));
    }
}
