//! HTTP server for site menus and breadcrumbs.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Admin API endpoints for menu CRUD in the tree editor format
//! - Rendered HTML fragments for menus, site navigation and breadcrumbs
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use menu_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 7980,
//!         settings_path: PathBuf::from("settings.json"),
//!         catalog_path: PathBuf::from("catalog.json"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum router (menu-server)
//!                      │
//!                      ├─► /api/sites/{site}/menus ──► MenuRepository ──► JsonFileSettings
//!                      │
//!                      └─► /sites/{site}/...        ──► NavigationTranslator / ContainerBuilder
//!                                                         │
//!                                                         └─► MemoryCatalog (sites, resources)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use menu_nav::{BreadcrumbOptions, MemoryCatalog};
use menu_settings::{JsonFileSettings, SettingsStore};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// JSON settings file holding menus and site settings.
    pub settings_path: PathBuf,
    /// JSON catalog of sites and resources.
    pub catalog_path: PathBuf,
    /// Breadcrumb defaults for sites without their own settings.
    pub breadcrumbs: BreadcrumbOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7980,
            settings_path: PathBuf::from("settings.json"),
            catalog_path: PathBuf::from("catalog.json"),
            breadcrumbs: BreadcrumbOptions::default(),
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the catalog or settings cannot be loaded or the
/// server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = MemoryCatalog::from_json_file(&config.catalog_path)?;
    let settings: Arc<dyn SettingsStore> = Arc::new(JsonFileSettings::open(&config.settings_path)?);
    tracing::info!(
        sites = catalog.sites.len(),
        settings = %config.settings_path.display(),
        "Loaded site data"
    );

    let state = Arc::new(AppState::new(catalog, settings, config.breadcrumbs));
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from menu config.
///
/// Breadcrumb defaults take the crumb list, separator, homepage flag,
/// collections URL and item set property from the `[breadcrumbs]` table.
#[must_use]
pub fn server_config_from_config(config: &menu_config::Config) -> ServerConfig {
    let crumbs = &config.breadcrumbs;
    let breadcrumbs = BreadcrumbOptions {
        separator: crumbs.separator.clone(),
        homepage: crumbs.homepage,
        collections_url: crumbs.collections_url.clone(),
        property_itemset: crumbs.property_itemset.clone(),
        ..BreadcrumbOptions::default()
    }
    .with_crumbs(&crumbs.crumbs);

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        settings_path: config.settings_path.clone(),
        catalog_path: config.catalog_path.clone(),
        breadcrumbs,
    }
}
