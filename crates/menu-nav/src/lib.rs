//! Navigation menus and breadcrumb trails for sites.
//!
//! This crate provides:
//! - [`NavigationTranslator`]: conversion between stored menus, the tree
//!   editor format and render-ready pages
//! - [`LinkTypeRegistry`]: pluggable [`LinkType`] strategies for `url`,
//!   `page`, `resource` and `structure` links
//! - [`ContainerBuilder`]: breadcrumb trails for resources and routes
//! - [`MenuRepository`]: named menus stored in site settings
//! - [`render_menu`] and [`render_breadcrumbs`]: HTML output
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use menu_nav::{
//!     DefaultRoutes, EditorNode, LinkTypeRegistry, MemoryCatalog, MenuRenderOptions, MenuRepository,
//!     NavigationTranslator, Services, Site, render_named_menu,
//! };
//! use menu_settings::{MemorySettings, SettingsStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let services = Services::new(Arc::new(MemoryCatalog::new()), Arc::new(DefaultRoutes::new()));
//! let translator = NavigationTranslator::new(Arc::new(LinkTypeRegistry::with_defaults()), services);
//! let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettings::new());
//! let menus = MenuRepository::new(settings, translator);
//!
//! let tree: Vec<EditorNode> = serde_json::from_str(
//!     r#"[{"text": "About", "data": {"type": "url", "data": {"url": "/about", "label": "About"}}}]"#,
//! )?;
//! let saved = menus.create(1, "Main menu", &tree)?;
//! assert_eq!(saved.slug, "main-menu");
//!
//! let site = Site::new(1, "demo");
//! let html = render_named_menu(&menus, &site, Some("main-menu"), &MenuRenderOptions::default())?;
//! assert_eq!(html, r#"<ul class="navigation"><li><a href="/about">About</a></li></ul>"#);
//! # Ok(())
//! # }
//! ```

mod breadcrumb;
mod catalog;
mod context;
mod error;
mod link;
mod link_types;
mod menus;
mod node;
mod render;
mod routes;
mod settings;
mod translator;

pub use breadcrumb::{
    BreadcrumbOptions, BreadcrumbTrail, CRUMBS, ContainerBuilder, Crumb, FlatCrumb, PrependLink,
    RouteMatch, TrailBuilder,
};
pub use catalog::{CatalogError, MemoryCatalog};
pub use context::{
    ItemSetTree, LinkContext, NoItemSetTree, PageId, Resource, ResourceApi, ResourceId,
    ResourceKind, ResourceRef, Services, Site, SitePage, UrlGenerator,
};
pub use error::{FieldError, TranslateError};
pub use link::{EditorPayload, LinkTarget, LinkType, LinkTypeRegistry, ResolvedLink};
pub use link_types::{PageLink, ResourceLink, StructureLink, UrlLink};
pub use menus::{MenuError, MenuRepository, RESERVED_SLUGS, SaveOutcome, slugify};
pub use node::{EditorNode, EditorNodeData, LinkData, NavNode, NavPage};
pub use render::{
    BreadcrumbRenderOptions, ListTemplate, MenuRenderOptions, MenuTemplate, escape_html,
    render_breadcrumbs, render_menu, render_named_menu, render_resource_menu,
};
pub use routes::{
    DefaultRoutes, PARAM_SITE_SLUG, ROUTE_ITEM_SET, ROUTE_PAGE, ROUTE_RESOURCE,
    ROUTE_RESOURCE_ID, ROUTE_SITE, ROUTE_TOP,
};
pub use settings::{
    BreadcrumbOverrides, COLLECTIONS_URL_KEY, CRUMBS_KEY, HOMEPAGE_KEY, MENU_KEY_PREFIX,
    PREPEND_KEY, PROPERTY_ITEMSET_KEY, RESOURCE_MENU_KEY, SEPARATOR_KEY, format_prepend_lines,
    menu_key, parse_prepend_lines, resource_menu,
};
pub use translator::{ActiveSelector, NavigationTranslator};
