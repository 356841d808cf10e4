//! Error types shared across the navigation crate.

use std::fmt;

use serde::Serialize;

/// Error during tree translation.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// A node names a link type that is not registered.
    #[error("Unknown link type: {0}")]
    UnknownLinkType(String),
}

/// Field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field path (e.g. `tree[0].children[2].id`).
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the field with the location of the node it belongs to.
    #[must_use]
    pub fn at(mut self, location: &str) -> Self {
        if !location.is_empty() {
            self.field = format!("{location}.{}", self.field);
        }
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
