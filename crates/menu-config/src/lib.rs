//! Configuration management for site menus.
//!
//! Parses `menu.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `settings.path`
//! - `catalog.path`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override settings file path.
    pub settings_path: Option<PathBuf>,
    /// Override catalog file path.
    pub catalog_path: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "menu.toml";

/// Crumb names accepted in `breadcrumbs.crumbs`.
pub const CRUMB_NAMES: [&str; 5] = ["home", "collections", "itemset", "itemsetstree", "current"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Settings store configuration (paths are relative strings from TOML).
    settings: FileConfigRaw,
    /// Catalog configuration (paths are relative strings from TOML).
    catalog: FileConfigRaw,
    /// Global breadcrumb defaults.
    pub breadcrumbs: BreadcrumbsConfig,

    /// Resolved settings file path (set after loading).
    #[serde(skip)]
    pub settings_path: PathBuf,
    /// Resolved catalog file path (set after loading).
    #[serde(skip)]
    pub catalog_path: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7980,
        }
    }
}

/// Raw file location as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileConfigRaw {
    path: Option<String>,
}

/// Global breadcrumb defaults, used when a site has no own setting.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BreadcrumbsConfig {
    /// Enabled crumbs, a subset of [`CRUMB_NAMES`].
    pub crumbs: Vec<String>,
    /// Separator rendered between crumbs.
    pub separator: String,
    /// Whether breadcrumbs are rendered on the site home page.
    pub homepage: bool,
    /// Custom URL for the "Collections" crumb.
    pub collections_url: String,
    /// Property term whose linked item set is the primary one.
    pub property_itemset: String,
}

impl Default for BreadcrumbsConfig {
    fn default() -> Self {
        Self {
            crumbs: CRUMB_NAMES.iter().map(|&c| c.to_owned()).collect(),
            separator: String::new(),
            homepage: false,
            collections_url: String::new(),
            property_itemset: String::new(),
        }
    }
}

impl BreadcrumbsConfig {
    /// Whether a crumb is enabled.
    #[must_use]
    pub fn has_crumb(&self, name: &str) -> bool {
        self.crumbs.iter().any(|c| c == name)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`settings.path`").
        field: String,
        /// Error message (e.g., "${`MENU_DATA`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `menu.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(path) = &settings.settings_path {
            self.settings_path.clone_from(path);
        }
        if let Some(path) = &settings.catalog_path {
            self.catalog_path.clone_from(path);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            settings: FileConfigRaw::default(),
            catalog: FileConfigRaw::default(),
            breadcrumbs: BreadcrumbsConfig::default(),
            settings_path: base.join("settings.json"),
            catalog_path: base.join("catalog.json"),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_breadcrumbs()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_breadcrumbs(&self) -> Result<(), ConfigError> {
        if let Some(unknown) = self
            .breadcrumbs
            .crumbs
            .iter()
            .find(|c| !CRUMB_NAMES.contains(&c.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "breadcrumbs.crumbs contains unknown crumb \"{unknown}\" (expected one of: {})",
                CRUMB_NAMES.join(", ")
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref path) = self.settings.path {
            self.settings.path = Some(expand::expand_env(path, "settings.path")?);
        }
        if let Some(ref path) = self.catalog.path {
            self.catalog.path = Some(expand::expand_env(path, "catalog.path")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.settings_path = resolve(self.settings.path.as_deref(), "settings.json");
        self.catalog_path = resolve(self.catalog.path.as_deref(), "catalog.json");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/base"));

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7980);
        assert_eq!(config.settings_path, PathBuf::from("/base/settings.json"));
        assert_eq!(config.catalog_path, PathBuf::from("/base/catalog.json"));
        assert_eq!(config.breadcrumbs.crumbs.len(), 5);
        assert!(!config.breadcrumbs.homepage);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.server.port, 7980);
        assert!(config.breadcrumbs.has_crumb("itemsetstree"));
    }

    #[test]
    fn test_parse_breadcrumbs_config() {
        let toml = r#"
[breadcrumbs]
crumbs = ["home", "current"]
separator = "/"
homepage = true
collections_url = "/s/demo/page/collections"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.breadcrumbs.has_crumb("home"));
        assert!(!config.breadcrumbs.has_crumb("collections"));
        assert_eq!(config.breadcrumbs.separator, "/");
        assert!(config.breadcrumbs.homepage);
        assert_eq!(
            config.breadcrumbs.collections_url,
            "/s/demo/page/collections"
        );
        assert_eq!(config.breadcrumbs.property_itemset, "");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[settings]
path = "data/settings.json"

[catalog]
path = "/srv/catalog.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.settings_path,
            PathBuf::from("/project/data/settings.json")
        );
        assert_eq!(config.catalog_path, PathBuf::from("/srv/catalog.json"));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("menu.toml");
        std::fs::write(&path, "[server]\nport = 9001\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.settings_path, dir.path().join("settings.json"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path_errors() {
        let result = Config::load(Some(Path::new("/nonexistent/menu.toml")), None);

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_apply_cli_settings_host_and_port() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.settings_path, PathBuf::from("/test/settings.json"));
    }

    #[test]
    fn test_apply_cli_settings_paths() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            settings_path: Some(PathBuf::from("/custom/s.json")),
            catalog_path: Some(PathBuf::from("/custom/c.json")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.settings_path, PathBuf::from("/custom/s.json"));
        assert_eq!(config.catalog_path, PathBuf::from("/custom/c.json"));
        assert_eq!(config.server.port, 7980);
    }

    #[test]
    fn test_expand_env_vars_settings_path() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MENU_CFG_TEST_DIR", "/data");
        }
        let toml = r#"
[settings]
path = "${MENU_CFG_TEST_DIR}/settings.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.settings_path, PathBuf::from("/data/settings.json"));
        unsafe {
            std::env::remove_var("MENU_CFG_TEST_DIR");
        }
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.host = String::new();

        assert_validation_error(&config, &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;

        assert_validation_error(&config, &["server.port"]);
    }

    #[test]
    fn test_validate_unknown_crumb() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.breadcrumbs.crumbs.push("sitemap".to_owned());

        assert_validation_error(&config, &["breadcrumbs.crumbs", "sitemap"]);
    }
}
