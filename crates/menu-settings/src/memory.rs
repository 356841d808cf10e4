//! In-memory settings store.
//!
//! Provides [`MemorySettings`] for tests and for hosts that keep settings
//! in process.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::store::{Scope, SettingsError, SettingsStore};

/// In-memory settings store.
///
/// Use the builder methods to seed the store with data.
///
/// # Example
///
/// ```
/// use menu_settings::{MemorySettings, Scope, SettingsStore};
/// use serde_json::json;
///
/// let settings = MemorySettings::new()
///     .with_value(Scope::Site(1), "menu_breadcrumbs_separator", json!(">"));
///
/// let value = settings.get(Scope::Site(1), "menu_breadcrumbs_separator").unwrap();
/// assert_eq!(value, Some(json!(">")));
/// ```
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<BTreeMap<(Scope, String), Value>>,
}

impl MemorySettings {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_value(self, scope: Scope, key: impl Into<String>, value: Value) -> Self {
        self.values
            .write()
            .unwrap()
            .insert((scope, key.into()), value);
        self
    }

    /// Number of stored keys across all scopes.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, scope: Scope, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self
            .values
            .read()
            .unwrap()
            .get(&(scope, key.to_owned()))
            .cloned())
    }

    fn set(&self, scope: Scope, key: &str, value: Value) -> Result<(), SettingsError> {
        self.values
            .write()
            .unwrap()
            .insert((scope, key.to_owned()), value);
        Ok(())
    }

    fn delete(&self, scope: Scope, key: &str) -> Result<bool, SettingsError> {
        Ok(self
            .values
            .write()
            .unwrap()
            .remove(&(scope, key.to_owned()))
            .is_some())
    }

    fn keys(&self, scope: Scope, prefix: &str) -> Result<Vec<String>, SettingsError> {
        Ok(self
            .values
            .read()
            .unwrap()
            .keys()
            .filter(|(s, k)| *s == scope && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }
}
