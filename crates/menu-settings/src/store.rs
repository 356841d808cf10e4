//! Settings store trait and error types.
//!
//! Provides the core [`SettingsStore`] trait for reading and replacing
//! settings values, along with [`SettingsError`] for unified error handling
//! across backends.
//!
//! # Scopes
//!
//! Every key lives in a [`Scope`]:
//! - [`Scope::Global`] - installation-wide settings
//! - [`Scope::Site`] - settings owned by one site (menus, breadcrumb options)
//!
//! Values are JSON documents. Writing a key replaces its whole value; there
//! are no partial updates.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

/// Identifier of a site.
pub type SiteId = u64;

/// Namespace a settings key belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Installation-wide settings.
    Global,
    /// Settings of a single site.
    Site(SiteId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Site(id) => write!(f, "site:{id}"),
        }
    }
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsErrorKind {
    /// Backing document could not be read or written.
    Io,
    /// Backing document is not valid JSON or has an unexpected shape.
    Corrupt,
    /// Value could not be serialized.
    Serialize,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Other/unknown error category.
    Other,
}

/// Settings error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct SettingsError {
    /// Semantic error category.
    pub kind: SettingsErrorKind,
    /// Key context (if applicable).
    pub key: Option<String>,
    /// File context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Memory", "JsonFile").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SettingsError {
    /// Create a new settings error.
    #[must_use]
    pub fn new(kind: SettingsErrorKind) -> Self {
        Self {
            kind,
            key: None,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach key context.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attach file context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a settings error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::new(SettingsErrorKind::Io)
            .with_path(path)
            .with_source(err)
    }

    /// Create a settings error for an unparsable backing document.
    #[must_use]
    pub fn corrupt(err: serde_json::Error, path: impl Into<PathBuf>) -> Self {
        Self::new(SettingsErrorKind::Corrupt)
            .with_path(path)
            .with_source(err)
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "[Backend] Kind: message (key: foo) (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            SettingsErrorKind::Io => "I/O error",
            SettingsErrorKind::Corrupt => "Corrupt settings",
            SettingsErrorKind::Serialize => "Serialization failed",
            SettingsErrorKind::Unavailable => "Unavailable",
            SettingsErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(key) = &self.key {
            write!(f, " (key: {key})")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Settings store abstraction.
///
/// Each key holds one JSON value per [`Scope`]. Implementations must make
/// [`set`](Self::set) and [`delete`](Self::delete) atomic with respect to
/// concurrent readers: a reader observes either the old value or the new
/// one, never a partial write.
pub trait SettingsStore: Send + Sync {
    /// Read a value.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    fn get(&self, scope: Scope, key: &str) -> Result<Option<Value>, SettingsError>;

    /// Replace the whole value stored under a key.
    fn set(&self, scope: Scope, key: &str, value: Value) -> Result<(), SettingsError>;

    /// Remove a key.
    ///
    /// Returns `true` if the key existed.
    fn delete(&self, scope: Scope, key: &str) -> Result<bool, SettingsError>;

    /// List keys in a scope starting with `prefix`, sorted.
    fn keys(&self, scope: Scope, prefix: &str) -> Result<Vec<String>, SettingsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::Global.to_string(), "global");
        assert_eq!(Scope::Site(3).to_string(), "site:3");
    }

    #[test]
    fn test_error_display_with_context() {
        let err = SettingsError::new(SettingsErrorKind::Unavailable)
            .with_backend("JsonFile")
            .with_key("menu_menu:main");

        assert_eq!(
            err.to_string(),
            "[JsonFile] Unavailable (key: menu_menu:main)"
        );
    }

    #[test]
    fn test_error_io_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SettingsError::io(io, "/tmp/settings.json");

        assert_eq!(err.kind, SettingsErrorKind::Io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("denied"));
        assert!(err.to_string().contains("/tmp/settings.json"));
    }
}
