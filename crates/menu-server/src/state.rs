//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use menu_nav::{
    BreadcrumbOptions, ContainerBuilder, ItemSetTree, LinkTypeRegistry, MemoryCatalog,
    MenuRepository, NavigationTranslator, ResourceApi, Services, Site,
};
use menu_settings::SettingsStore;

use crate::error::ServerError;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Sites and resources.
    pub(crate) catalog: Arc<MemoryCatalog>,
    /// Stored menus.
    pub(crate) menus: MenuRepository,
    /// Breadcrumb trail builder.
    pub(crate) breadcrumbs: ContainerBuilder,
    /// Breadcrumb options used when a site has no settings of its own.
    pub(crate) breadcrumb_defaults: BreadcrumbOptions,
}

impl AppState {
    /// Wire the catalog and settings store into translator, repository and
    /// breadcrumb builder.
    pub(crate) fn new(
        catalog: MemoryCatalog,
        settings: Arc<dyn SettingsStore>,
        breadcrumb_defaults: BreadcrumbOptions,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let mut services = Services::new(
            Arc::clone(&catalog) as Arc<dyn ResourceApi>,
            Arc::new(menu_nav::DefaultRoutes::new()),
        );
        if catalog.is_available() {
            services = services.with_item_set_tree(Arc::clone(&catalog) as Arc<dyn ItemSetTree>);
        }

        let translator =
            NavigationTranslator::new(Arc::new(LinkTypeRegistry::with_defaults()), services.clone());
        Self {
            menus: MenuRepository::new(settings, translator),
            breadcrumbs: ContainerBuilder::new(services),
            catalog,
            breadcrumb_defaults,
        }
    }

    /// Site by slug.
    pub(crate) fn site(&self, slug: &str) -> Result<&Site, ServerError> {
        self.catalog
            .site_by_slug(slug)
            .ok_or_else(|| ServerError::SiteNotFound(slug.to_owned()))
    }
}
