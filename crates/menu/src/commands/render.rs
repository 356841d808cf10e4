//! `menu render` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use menu_config::{CliSettings, Config};
use menu_nav::{
    ActiveSelector, DefaultRoutes, ItemSetTree, LinkTypeRegistry, MemoryCatalog,
    MenuRenderOptions, MenuRepository, NavigationTranslator, ResourceApi, Services,
    render_named_menu, render_resource_menu,
};
use menu_settings::{JsonFileSettings, SettingsStore};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to configuration file (default: auto-discover menu.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON settings file (overrides config).
    #[arg(long, env = "MENU_SETTINGS")]
    settings: Option<PathBuf>,

    /// JSON catalog of sites and resources (overrides config).
    #[arg(long, env = "MENU_CATALOG")]
    catalog: Option<PathBuf>,

    /// Site slug.
    #[arg(long)]
    site: String,

    /// Menu slug (default: the site's own navigation).
    #[arg(long)]
    menu: Option<String>,

    /// Render the menu selected for resource pages.
    #[arg(long, conflicts_with = "menu")]
    resource_menu: bool,

    /// URL of the active page.
    #[arg(long)]
    active: Option<String>,

    /// Deepest level to render (0 = top level only).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, catalog or settings fail to load,
    /// or the site or menu does not exist.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            settings_path: self.settings.clone(),
            catalog_path: self.catalog.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        config.validate()?;

        let html = self.render(&config)?;
        if html.is_empty() {
            output.warning("Menu has no visible pages");
        }
        output.stdout(&html)?;
        Ok(())
    }

    fn render(&self, config: &Config) -> Result<String, CliError> {
        let catalog = Arc::new(MemoryCatalog::from_json_file(&config.catalog_path)?);
        let settings: Arc<dyn SettingsStore> =
            Arc::new(JsonFileSettings::open(&config.settings_path)?);

        let site = catalog
            .site_by_slug(&self.site)
            .ok_or_else(|| CliError::Validation(format!("Site not found: {}", self.site)))?;

        let mut services = Services::new(
            Arc::clone(&catalog) as Arc<dyn ResourceApi>,
            Arc::new(DefaultRoutes::new()),
        );
        if catalog.is_available() {
            services = services.with_item_set_tree(Arc::clone(&catalog) as Arc<dyn ItemSetTree>);
        }
        let translator =
            NavigationTranslator::new(Arc::new(LinkTypeRegistry::with_defaults()), services);
        let menus = MenuRepository::new(settings, translator);

        let options = MenuRenderOptions {
            active: self
                .active
                .clone()
                .map_or(ActiveSelector::Framework, ActiveSelector::Url),
            max_depth: self.max_depth,
            ..MenuRenderOptions::default()
        };
        if self.resource_menu {
            return Ok(render_resource_menu(&menus, site, &options)?);
        }
        Ok(render_named_menu(&menus, site, self.menu.as_deref(), &options)?)
    }
}
