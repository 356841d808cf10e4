//! Menu admin API endpoints.
//!
//! Create, read, update and delete the named menus of a site. Trees are
//! exchanged in the tree editor format; `/raw` exposes the stored nodes.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use menu_nav::{EditorNode, NavNode};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET /api/sites/{site}/menus.
#[derive(Serialize)]
struct MenuListResponse {
    site: String,
    menus: Vec<String>,
}

/// Body of POST /api/sites/{site}/menus.
#[derive(Deserialize)]
pub(crate) struct CreateMenuRequest {
    name: String,
    #[serde(default)]
    tree: Vec<EditorNode>,
}

/// Body of PUT /api/sites/{site}/menus/{slug}.
#[derive(Deserialize)]
pub(crate) struct UpdateMenuRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tree: Vec<EditorNode>,
}

/// Response for a successful save.
#[derive(Serialize)]
struct SaveResponse {
    slug: String,
    warnings: Vec<String>,
}

/// Response for GET /api/sites/{site}/menus/{slug}.
#[derive(Serialize)]
struct EditorTreeResponse {
    slug: String,
    tree: Vec<EditorNode>,
}

/// Response for GET /api/sites/{site}/menus/{slug}/raw.
#[derive(Serialize)]
struct RawMenuResponse {
    slug: String,
    nodes: Vec<NavNode>,
}

/// Query of DELETE /api/sites/{site}/menus/{slug}.
#[derive(Deserialize)]
pub(crate) struct DeleteQuery {
    #[serde(default)]
    confirm: bool,
}

/// Handle GET /api/sites/{site}/menus.
pub(crate) async fn list_menus(
    Path(site): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state.site(&site)?.id;
    let menus = state.menus.list(id)?;
    Ok(Json(MenuListResponse { site, menus }))
}

/// Handle POST /api/sites/{site}/menus.
pub(crate) async fn create_menu(
    Path(site): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMenuRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state.site(&site)?.id;
    let outcome = state.menus.create(id, &request.name, &request.tree)?;
    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            slug: outcome.slug,
            warnings: outcome.warnings,
        }),
    ))
}

/// Handle GET /api/sites/{site}/menus/{slug}.
pub(crate) async fn get_menu(
    Path((site, slug)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let site = state.site(&site)?;
    let tree = state
        .menus
        .editor_tree(site, &slug)?
        .ok_or_else(|| ServerError::MenuNotFound(slug.clone()))?;
    Ok(Json(EditorTreeResponse { slug, tree }))
}

/// Handle GET /api/sites/{site}/menus/{slug}/raw.
pub(crate) async fn get_menu_raw(
    Path((site, slug)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state.site(&site)?.id;
    let nodes = state
        .menus
        .get(id, &slug)?
        .ok_or_else(|| ServerError::MenuNotFound(slug.clone()))?;
    Ok(Json(RawMenuResponse { slug, nodes }))
}

/// Handle PUT /api/sites/{site}/menus/{slug}.
pub(crate) async fn update_menu(
    Path((site, slug)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateMenuRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state.site(&site)?.id;
    let outcome = state
        .menus
        .update(id, &slug, request.name.as_deref(), &request.tree)?;
    Ok(Json(SaveResponse {
        slug: outcome.slug,
        warnings: outcome.warnings,
    }))
}

/// Handle DELETE /api/sites/{site}/menus/{slug}.
///
/// Nothing is deleted unless the request carries `confirm=true`.
pub(crate) async fn delete_menu(
    Path((site, slug)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state.site(&site)?.id;
    if !state.menus.list(id)?.contains(&slug) {
        return Err(ServerError::MenuNotFound(slug));
    }
    if !query.confirm {
        return Err(ServerError::ConfirmationRequired(slug));
    }

    state.menus.delete(id, &slug)?;
    Ok(Json(serde_json::json!({"deleted": slug})))
}
