//! Navigation tree shapes.
//!
//! A menu passes through three shapes:
//! - [`NavNode`]: canonical storage form, persisted in site settings
//! - [`EditorNode`]: tree-editor form, with resolved labels and URLs
//! - [`NavPage`]: render-ready form, built fresh for each request
//!
//! Only [`NavNode`] is ever stored. Editor and render shapes are views
//! produced by [`NavigationTranslator`](crate::NavigationTranslator).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::link::LinkTarget;

/// Type-specific link payload (e.g. `{"id": 5, "label": "Maps"}`).
pub type LinkData = serde_json::Map<String, Value>;

/// Canonical navigation node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    /// Link type discriminator (`url`, `page`, `resource`, `structure`, ...).
    #[serde(rename = "type")]
    pub link_type: String,
    /// Type-specific payload.
    #[serde(default)]
    pub data: LinkData,
    /// Children in display order.
    #[serde(default)]
    pub links: Vec<NavNode>,
}

impl NavNode {
    /// Create a leaf node.
    #[must_use]
    pub fn new(link_type: impl Into<String>, data: LinkData) -> Self {
        Self {
            link_type: link_type.into(),
            data,
            links: Vec::new(),
        }
    }

    /// Append children.
    #[must_use]
    pub fn with_links(mut self, links: Vec<NavNode>) -> Self {
        self.links = links;
        self
    }

    /// Configured label, if present and not blank.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        data_label(&self.data)
    }
}

/// Read a non-blank `label` from link data.
pub(crate) fn data_label(data: &LinkData) -> Option<&str> {
    data.get("label")
        .and_then(Value::as_str)
        .filter(|label| !label.trim().is_empty())
}

/// Read a numeric id from link data, accepting numbers and numeric strings.
pub(crate) fn data_id(data: &LinkData) -> Option<u64> {
    match data.get("id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a string field from link data.
pub(crate) fn data_str<'a>(data: &'a LinkData, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

/// Node in the tree editor (jsTree) format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorNode {
    /// Display label.
    pub text: String,
    /// Link description.
    pub data: EditorNodeData,
    /// Children in display order.
    #[serde(default)]
    pub children: Vec<EditorNode>,
}

/// Payload of an [`EditorNode`].
///
/// `data` is the canonical link payload and is never altered by the
/// editor view. `url`, `is_public` and `details` are resolved for display
/// and dropped when the tree is translated back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorNodeData {
    /// Link type discriminator.
    #[serde(rename = "type")]
    pub link_type: String,
    /// Canonical link payload.
    #[serde(default)]
    pub data: LinkData,
    /// Resolved URL, empty when the link is not navigable.
    #[serde(default)]
    pub url: String,
    /// Whether the link target is publicly visible.
    #[serde(default = "default_true")]
    pub is_public: bool,
    /// Marked for removal by the editor.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub remove: bool,
    /// Extra presentation fields from the link type.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: LinkData,
}

fn default_true() -> bool {
    true
}

/// Render-ready navigation page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NavPage {
    /// Display label (never empty).
    pub label: String,
    /// Where the page points.
    pub target: LinkTarget,
    /// Resolved URL, empty when the page is not navigable.
    pub href: String,
    /// CSS class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Hidden pages are skipped by renderers.
    pub visible: bool,
    /// Active flag. `None` defers to the renderer's own path matching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Child pages in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<NavPage>,
}

impl NavPage {
    /// Whether this page or any descendant is explicitly active.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.active == Some(true) || self.pages.iter().any(NavPage::has_active)
    }
}
