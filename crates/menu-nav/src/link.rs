//! Link-type strategies.
//!
//! Each navigation node names a link type (`url`, `page`, `resource`,
//! `structure`, ...). A [`LinkType`] knows how to validate that node's
//! payload, compute its fallback label, resolve where it points and
//! describe it for the tree editor.
//!
//! Strategies are looked up by name in a [`LinkTypeRegistry`]. Hosts can
//! register their own kinds next to the built-in ones without touching
//! the translator.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::context::LinkContext;
use crate::error::{FieldError, TranslateError};
use crate::link_types::{PageLink, ResourceLink, StructureLink, UrlLink};
use crate::node::LinkData;

/// Where a link points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkTarget {
    /// Named route, assembled into a URL by a
    /// [`UrlGenerator`](crate::UrlGenerator).
    Route {
        /// Route name (e.g. `site/page`).
        name: String,
        /// Route parameters. `site-slug` is filled in at resolution time.
        params: BTreeMap<String, String>,
        /// Query string parameters.
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        query: BTreeMap<String, String>,
    },
    /// Literal URI. Empty means not navigable.
    Uri(String),
}

impl LinkTarget {
    /// Route target without parameters.
    #[must_use]
    pub fn route(name: impl Into<String>) -> Self {
        Self::Route {
            name: name.into(),
            params: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }

    /// Add a route parameter. No effect on URI targets.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Route { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// Add a query parameter. No effect on URI targets.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Route { query, .. } = &mut self {
            query.insert(key.into(), value.into());
        }
        self
    }

    /// Non-navigable target.
    #[must_use]
    pub fn none() -> Self {
        Self::Uri(String::new())
    }
}

/// Resolved target of a link plus render hints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Where the link points.
    pub target: LinkTarget,
    /// CSS class for the rendered item.
    pub class: Option<String>,
    /// Hidden links are not rendered.
    pub visible: bool,
}

impl ResolvedLink {
    /// Visible link without a class.
    #[must_use]
    pub fn new(target: LinkTarget) -> Self {
        Self {
            target,
            class: None,
            visible: true,
        }
    }

    /// Set the CSS class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Mark the link hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Presentation fields shown in the tree editor.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorPayload {
    /// Whether the link target is publicly visible.
    pub is_public: bool,
    /// Extra type-specific fields.
    pub details: LinkData,
}

impl Default for EditorPayload {
    fn default() -> Self {
        Self {
            is_public: true,
            details: LinkData::new(),
        }
    }
}

/// Strategy for one link type.
///
/// Strategies own their defaults: a missing key in `data` must never make
/// a strategy fail, only [`validate`](Self::validate) reports it.
pub trait LinkType: Send + Sync {
    /// Human-readable name, used as the last-resort label.
    fn name(&self) -> &str;

    /// Check that `data` holds what this link type requires.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    fn validate(&self, data: &LinkData) -> Result<(), FieldError>;

    /// Label computed from `data` and the site, if any.
    fn label(&self, data: &LinkData, cx: &LinkContext<'_>) -> Option<String>;

    /// Where the link points.
    fn target(&self, data: &LinkData, cx: &LinkContext<'_>) -> ResolvedLink;

    /// Presentation fields for the tree editor.
    fn editor_payload(&self, data: &LinkData, cx: &LinkContext<'_>) -> EditorPayload {
        let _ = (data, cx);
        EditorPayload::default()
    }
}

/// Registry of link types keyed by discriminator.
#[derive(Clone, Default)]
pub struct LinkTypeRegistry {
    types: HashMap<String, Arc<dyn LinkType>>,
}

impl LinkTypeRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `url`, `page`, `resource` and `structure`
    /// link types.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with("url", UrlLink)
            .with("page", PageLink)
            .with("resource", ResourceLink)
            .with("structure", StructureLink)
    }

    /// Register a link type, replacing any previous one with that name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, link_type: impl LinkType + 'static) -> Self {
        self.register(name, Arc::new(link_type));
        self
    }

    /// Register a shared link type.
    pub fn register(&mut self, name: impl Into<String>, link_type: Arc<dyn LinkType>) {
        self.types.insert(name.into(), link_type);
    }

    /// Look up a link type.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::UnknownLinkType`] if no strategy is
    /// registered under `name`.
    pub fn get(&self, name: &str) -> Result<&dyn LinkType, TranslateError> {
        self.types.get(name).map(AsRef::as_ref).ok_or_else(|| {
            tracing::warn!(link_type = %name, "Unknown link type in navigation");
            TranslateError::UnknownLinkType(name.to_owned())
        })
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
