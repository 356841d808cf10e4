//! Settings storage for site menus and breadcrumbs.
//!
//! This crate provides a [`SettingsStore`] trait abstracting the key-value
//! store that holds menus and breadcrumb options. This enables:
//!
//! - **Unit testing** against an in-memory store
//! - **Backend flexibility** (JSON file, database table, remote service)
//! - **Clean separation** between menu logic and persistence
//!
//! # Architecture
//!
//! The crate provides:
//! - [`SettingsStore`] trait with `get()`, `set()`, `delete()` and `keys()`
//! - [`MemorySettings`] for tests and in-process hosts
//! - [`JsonFileSettings`] persisting every scope in one JSON document
//!
//! # Example
//!
//! ```
//! use menu_settings::{MemorySettings, Scope, SettingsStore};
//! use serde_json::json;
//!
//! let settings = MemorySettings::new();
//! settings.set(Scope::Site(1), "menu_menu:main", json!([])).unwrap();
//! let keys = settings.keys(Scope::Site(1), "menu_menu:").unwrap();
//! assert_eq!(keys, vec!["menu_menu:main"]);
//! ```

mod json_file;
mod memory;
mod store;

pub use json_file::JsonFileSettings;
pub use memory::MemorySettings;
pub use store::{Scope, SettingsError, SettingsErrorKind, SettingsStore, SiteId};
