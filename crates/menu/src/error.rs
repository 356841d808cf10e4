//! CLI error types.

use menu_config::ConfigError;
use menu_nav::{CatalogError, MenuError};
use menu_settings::SettingsError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Menu(#[from] MenuError),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(String),
}
