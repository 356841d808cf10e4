//! Named menus stored in site settings.
//!
//! Each menu is a list of [`NavNode`]s stored under `menu_menu:<slug>` in
//! the site scope. Saves replace the whole value; there is no partial
//! update and no history.
//!
//! # Naming
//!
//! A menu's slug is derived from its name with [`slugify`]. A slug that is
//! reserved for admin routes or already used by another menu of the site
//! gets a random 8-hex-digit suffix. The save still succeeds and the rename
//! is reported in [`SaveOutcome::warnings`].

use std::sync::Arc;

use menu_settings::{Scope, SettingsError, SettingsStore, SiteId};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::context::Site;
use crate::error::{FieldError, TranslateError};
use crate::node::{EditorNode, NavNode};
use crate::settings::{MENU_KEY_PREFIX, menu_key, resource_menu};
use crate::translator::NavigationTranslator;

/// Slugs used by admin routes.
pub const RESERVED_SLUGS: [&str; 10] = [
    "index",
    "browse",
    "show",
    "add",
    "edit",
    "delete",
    "delete-confirm",
    "batch-delete",
    "batch-edit",
    "search",
];

/// Error from a menu operation.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// No menu with this slug.
    #[error("Menu not found: {0}")]
    NotFound(String),
    /// Rejected save; nothing was written.
    #[error("Invalid menu: {}", join_fields(.0))]
    Validation(Vec<FieldError>),
    /// Stored value is not a list of navigation nodes.
    #[error("Stored menu {slug} is unreadable: {source}")]
    Corrupt {
        /// Menu slug.
        slug: String,
        /// Deserialization failure.
        #[source]
        source: serde_json::Error,
    },
    /// Tree translation failed.
    #[error(transparent)]
    Translate(#[from] TranslateError),
    /// Settings store failure.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of a successful save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Slug the menu was saved under.
    pub slug: String,
    /// User-facing notices (e.g. a conflict rename).
    pub warnings: Vec<String>,
}

/// Normalize a menu name into a slug.
///
/// Strips diacritics, lowercases, turns every run of characters outside
/// `[a-z0-9_-]` into a single `-` and drops trailing `-`. Surrounding
/// whitespace in the name is ignored.
///
/// ```
/// assert_eq!(menu_nav::slugify("Menu Principal (été)"), "menu-principal-ete");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().nfd().filter(|c| !is_combining_mark(*c)) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.truncate(slug.trim_end_matches('-').len());
    slug
}

fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_owned()
}

/// Menus of all sites, on top of a settings store.
#[derive(Clone)]
pub struct MenuRepository {
    settings: Arc<dyn SettingsStore>,
    translator: NavigationTranslator,
}

impl MenuRepository {
    /// Create a repository.
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsStore>, translator: NavigationTranslator) -> Self {
        Self {
            settings,
            translator,
        }
    }

    /// Translator used for editor trees.
    #[must_use]
    pub fn translator(&self) -> &NavigationTranslator {
        &self.translator
    }

    /// Underlying settings store.
    #[must_use]
    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.settings
    }

    /// Slugs of a site's menus, sorted.
    pub fn list(&self, site: SiteId) -> Result<Vec<String>, MenuError> {
        Ok(self
            .settings
            .keys(Scope::Site(site), MENU_KEY_PREFIX)?
            .into_iter()
            .map(|key| key[MENU_KEY_PREFIX.len()..].to_owned())
            .collect())
    }

    /// Stored nodes of a menu, `None` if it does not exist.
    ///
    /// An existing empty menu is `Some(vec![])`.
    pub fn get(&self, site: SiteId, slug: &str) -> Result<Option<Vec<NavNode>>, MenuError> {
        let Some(value) = self.settings.get(Scope::Site(site), &menu_key(slug))? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| MenuError::Corrupt {
                slug: slug.to_owned(),
                source,
            })
    }

    /// Editor tree of a menu, `None` if it does not exist.
    pub fn editor_tree(
        &self,
        site: &Site,
        slug: &str,
    ) -> Result<Option<Vec<EditorNode>>, MenuError> {
        match self.get(site.id, slug)? {
            Some(nodes) => Ok(Some(self.translator.to_editor_tree(site, &nodes)?)),
            None => Ok(None),
        }
    }

    /// Create a menu from an editor tree.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Validation`] without writing anything if the
    /// name is blank or any node fails its link type's validation.
    pub fn create(
        &self,
        site: SiteId,
        name: &str,
        tree: &[EditorNode],
    ) -> Result<SaveOutcome, MenuError> {
        let nodes = self.validated(Some(name), tree)?;
        let (slug, warnings) = self.available_slug(site, name, None)?;

        self.write(site, &slug, &nodes)?;
        tracing::info!(site, slug = %slug, nodes = nodes.len(), "Created menu");
        Ok(SaveOutcome { slug, warnings })
    }

    /// Replace a menu's tree, renaming it when `name` maps to another slug.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::NotFound`] if the menu does not exist and
    /// [`MenuError::Validation`] without writing anything if the tree is
    /// invalid.
    pub fn update(
        &self,
        site: SiteId,
        slug: &str,
        name: Option<&str>,
        tree: &[EditorNode],
    ) -> Result<SaveOutcome, MenuError> {
        let nodes = self.validated(name, tree)?;
        if self.get(site, slug)?.is_none() {
            return Err(MenuError::NotFound(slug.to_owned()));
        }

        let renamed = name.filter(|name| slugify(name) != slug);
        let Some(name) = renamed else {
            self.write(site, slug, &nodes)?;
            tracing::info!(site, slug = %slug, nodes = nodes.len(), "Updated menu");
            return Ok(SaveOutcome {
                slug: slug.to_owned(),
                warnings: Vec::new(),
            });
        };

        let (new_slug, warnings) = self.available_slug(site, name, Some(slug))?;
        self.write(site, &new_slug, &nodes)?;
        self.settings.delete(Scope::Site(site), &menu_key(slug))?;
        tracing::info!(site, from = %slug, to = %new_slug, "Renamed menu");
        Ok(SaveOutcome {
            slug: new_slug,
            warnings,
        })
    }

    /// Delete a menu. Returns `false` if it did not exist.
    pub fn delete(&self, site: SiteId, slug: &str) -> Result<bool, MenuError> {
        let deleted = self.settings.delete(Scope::Site(site), &menu_key(slug))?;
        if deleted {
            tracing::info!(site, slug = %slug, "Deleted menu");
        }
        Ok(deleted)
    }

    /// Menu selected for resource pages, with its nodes.
    ///
    /// `None` when no menu is selected or the selected menu no longer
    /// exists.
    pub fn resource_menu(&self, site: SiteId) -> Result<Option<(String, Vec<NavNode>)>, MenuError> {
        let Some(slug) = resource_menu(self.settings.as_ref(), site)? else {
            return Ok(None);
        };
        Ok(self.get(site, &slug)?.map(|nodes| (slug, nodes)))
    }

    fn validated(&self, name: Option<&str>, tree: &[EditorNode]) -> Result<Vec<NavNode>, MenuError> {
        let nodes = NavigationTranslator::from_editor_tree(tree);
        let mut errors = Vec::new();
        if name.is_some_and(|name| name.trim().is_empty()) {
            errors.push(FieldError::new("name", "Menu name is required"));
        }
        errors.extend(self.translator.validate(&nodes));

        if errors.is_empty() {
            Ok(nodes)
        } else {
            tracing::debug!(errors = errors.len(), "Rejected menu save");
            Err(MenuError::Validation(errors))
        }
    }

    /// Slug for `name` that is neither reserved nor used by another menu.
    fn available_slug(
        &self,
        site: SiteId,
        name: &str,
        current: Option<&str>,
    ) -> Result<(String, Vec<String>), MenuError> {
        let base = slugify(name);
        let existing = self.list(site)?;
        let taken = |slug: &str| {
            RESERVED_SLUGS.contains(&slug)
                || (Some(slug) != current && existing.iter().any(|s| s == slug))
        };

        if base.is_empty() {
            let slug = format!("menu-{}", random_suffix());
            return Ok((
                slug.clone(),
                vec![format!("Menu name \"{name}\" has no usable characters; saved as \"{slug}\"")],
            ));
        }
        if !taken(&base) {
            return Ok((base, Vec::new()));
        }

        let mut slug = format!("{base}-{}", random_suffix());
        while taken(&slug) {
            slug = format!("{base}-{}", random_suffix());
        }
        tracing::info!(site, requested = %base, slug = %slug, "Menu slug conflict, renamed");
        let warning =
            format!("Menu name \"{base}\" is reserved or already used; saved as \"{slug}\"");
        Ok((slug, vec![warning]))
    }

    fn write(&self, site: SiteId, slug: &str, nodes: &[NavNode]) -> Result<(), MenuError> {
        let value = serde_json::to_value(nodes).map_err(|source| MenuError::Corrupt {
            slug: slug.to_owned(),
            source,
        })?;
        self.settings.set(Scope::Site(site), &menu_key(slug), value)?;
        Ok(())
    }
}
