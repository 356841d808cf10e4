//! JSON file settings store.
//!
//! Provides [`JsonFileSettings`], which keeps every scope in one JSON
//! document on disk:
//!
//! ```json
//! {
//!   "global": { "menu_breadcrumbs_homepage": false },
//!   "sites": { "1": { "menu_menu:main": [] } }
//! }
//! ```
//!
//! Each write serializes the whole document to a sibling temp file and
//! renames it over the target, so readers of the file never see a partial
//! write.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{Scope, SettingsError, SettingsErrorKind, SettingsStore, SiteId};

/// Backend identifier for error messages.
const BACKEND: &str = "JsonFile";

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    global: BTreeMap<String, Value>,
    #[serde(default)]
    sites: BTreeMap<SiteId, BTreeMap<String, Value>>,
}

impl Document {
    fn scope(&self, scope: Scope) -> Option<&BTreeMap<String, Value>> {
        match scope {
            Scope::Global => Some(&self.global),
            Scope::Site(id) => self.sites.get(&id),
        }
    }

    fn scope_mut(&mut self, scope: Scope) -> &mut BTreeMap<String, Value> {
        match scope {
            Scope::Global => &mut self.global,
            Scope::Site(id) => self.sites.entry(id).or_default(),
        }
    }
}

/// Settings store persisted as a single JSON file.
///
/// The file is read once on [`open`](Self::open); the in-memory copy is the
/// source of truth afterwards and is flushed on every mutation.
///
/// # Panics
///
/// Store methods panic if the internal lock is poisoned.
pub struct JsonFileSettings {
    path: PathBuf,
    document: Mutex<Document>,
}

impl JsonFileSettings {
    /// Open a settings file, starting empty if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file exists but cannot be read or
    /// is not a valid settings document.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Document::default(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| SettingsError::corrupt(e, &path).with_backend(BACKEND))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Settings file not found, starting empty");
                Document::default()
            }
            Err(e) => return Err(SettingsError::io(e, &path).with_backend(BACKEND)),
        };

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, document: &Document) -> Result<(), SettingsError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| {
            SettingsError::new(SettingsErrorKind::Serialize)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| SettingsError::io(e, parent).with_backend(BACKEND))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| SettingsError::io(e, &tmp).with_backend(BACKEND))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| SettingsError::io(e, &self.path).with_backend(BACKEND))
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<Value>, SettingsError> {
        let document = self.document.lock().unwrap();
        Ok(document.scope(scope).and_then(|m| m.get(key)).cloned())
    }

    fn set(&self, scope: Scope, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut document = self.document.lock().unwrap();
        let previous = document.scope_mut(scope).insert(key.to_owned(), value);

        if let Err(e) = self.flush(&document) {
            // Keep memory in line with disk.
            let values = document.scope_mut(scope);
            match previous {
                Some(old) => values.insert(key.to_owned(), old),
                None => values.remove(key),
            };
            tracing::warn!(key = %key, error = %e, "Failed to persist setting");
            return Err(e.with_key(key));
        }
        Ok(())
    }

    fn delete(&self, scope: Scope, key: &str) -> Result<bool, SettingsError> {
        let mut document = self.document.lock().unwrap();
        let Some(previous) = document.scope_mut(scope).remove(key) else {
            return Ok(false);
        };

        if let Err(e) = self.flush(&document) {
            document.scope_mut(scope).insert(key.to_owned(), previous);
            tracing::warn!(key = %key, error = %e, "Failed to persist setting removal");
            return Err(e.with_key(key));
        }
        Ok(true)
    }

    fn keys(&self, scope: Scope, prefix: &str) -> Result<Vec<String>, SettingsError> {
        let document = self.document.lock().unwrap();
        Ok(document
            .scope(scope)
            .map(|m| {
                m.keys()
                    .filter(|k| k.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
