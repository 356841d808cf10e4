//! `menu serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use menu_config::{CliSettings, Config};
use menu_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover menu.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// JSON settings file (overrides config).
    #[arg(long, env = "MENU_SETTINGS")]
    settings: Option<PathBuf>,

    /// JSON catalog of sites and resources (overrides config).
    #[arg(long, env = "MENU_CATALOG")]
    catalog: Option<PathBuf>,

    /// Enable verbose output (request and settings logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            settings_path: self.settings,
            catalog_path: self.catalog,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        config.validate()?;

        output.highlight(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.path("settings", &config.settings_path);
        output.path("catalog", &config.catalog_path);
        if let Some(path) = &config.config_path {
            output.path("config", path);
        } else {
            output.warning("No menu.toml found, using defaults");
        }

        run_server(server_config_from_config(&config))
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
