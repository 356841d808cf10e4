//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use menu_nav::{FieldError, MenuError};
use menu_settings::SettingsError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// No site with this slug.
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    /// No menu with this slug.
    #[error("Menu not found: {0}")]
    MenuNotFound(String),

    /// Rejected menu save.
    #[error("Invalid menu")]
    Validation(Vec<FieldError>),

    /// Destructive request without `confirm=true`.
    #[error("Confirmation required to delete menu {0}")]
    ConfirmationRequired(String),

    /// Invalid query parameter.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Menu operation failed.
    #[error(transparent)]
    Menu(MenuError),

    /// Settings store failure.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl From<MenuError> for ServerError {
    fn from(error: MenuError) -> Self {
        match error {
            MenuError::NotFound(slug) => Self::MenuNotFound(slug),
            MenuError::Validation(errors) => Self::Validation(errors),
            MenuError::Settings(error) => Self::Settings(error),
            error => Self::Menu(error),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::SiteNotFound(slug) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Site not found", "site": slug}),
            ),
            Self::MenuNotFound(slug) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Menu not found", "menu": slug}),
            ),
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": "Invalid menu", "fields": errors}),
            ),
            Self::ConfirmationRequired(slug) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "Confirmation required",
                    "message": format!(
                        "Delete menu \"{slug}\"? Repeat the request with confirm=true."
                    ),
                }),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({"error": message})),
            Self::Menu(e) => {
                tracing::warn!(error = %e, "Menu request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
            Self::Settings(e) => {
                tracing::warn!(error = %e, "Settings backend failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
