//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{menus, render};
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/sites/{site}/menus",
            get(menus::list_menus).post(menus::create_menu),
        )
        .route(
            "/api/sites/{site}/menus/{slug}",
            get(menus::get_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route("/api/sites/{site}/menus/{slug}/raw", get(menus::get_menu_raw));

    let public_routes = Router::new()
        .route("/sites/{site}/menus/{slug}", get(render::get_rendered_menu))
        .route("/sites/{site}/navigation", get(render::get_rendered_navigation))
        .route(
            "/sites/{site}/resource-menu",
            get(render::get_rendered_resource_menu),
        )
        .route("/sites/{site}/breadcrumbs", get(render::get_rendered_breadcrumbs));

    Router::new()
        .merge(api_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use menu_nav::{
        BreadcrumbOptions, CRUMBS_KEY, MemoryCatalog, RESOURCE_MENU_KEY, Resource, ResourceKind,
        Site, SitePage,
    };
    use menu_settings::{MemorySettings, Scope, SettingsStore};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn router() -> Router {
        router_with_settings().0
    }

    fn router_with_settings() -> (Router, Arc<dyn SettingsStore>) {
        let mut site = Site::new(1, "demo");
        site.pages.push(SitePage {
            id: 1,
            slug: "about".to_owned(),
            title: "About us".to_owned(),
            is_public: true,
        });
        let mut item = Resource::new(7, ResourceKind::Item, "Old map");
        item.item_sets.push(5);
        let catalog = MemoryCatalog::new()
            .with_site(site)
            .with_resource(Resource::new(5, ResourceKind::ItemSet, "Maps"))
            .with_resource(item);
        let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettings::new());

        let router = create_router(Arc::new(AppState::new(
            catalog,
            Arc::clone(&settings),
            BreadcrumbOptions::default(),
        )));
        (router, settings)
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_string(&value).unwrap())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn call_json(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, text) = call(router, method, uri, body).await;
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    fn footer_tree() -> Value {
        json!({
            "name": "footer",
            "tree": [
                {"text": "A", "data": {"type": "url", "data": {"url": "/a", "label": "A"}}, "children": []},
                {"text": "About", "data": {"type": "page", "data": {"id": 1}}, "children": []}
            ]
        })
    }

    #[tokio::test]
    async fn test_menu_crud() {
        let router = router();

        let (status, body) =
            call_json(&router, "POST", "/api/sites/demo/menus", Some(footer_tree())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"slug": "footer", "warnings": []}));

        let (status, body) = call_json(&router, "GET", "/api/sites/demo/menus", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"site": "demo", "menus": ["footer"]}));

        let (_, body) = call_json(&router, "GET", "/api/sites/demo/menus/footer", None).await;
        assert_eq!(body["tree"][1]["text"], "About us");
        assert_eq!(body["tree"][1]["data"]["url"], "/s/demo/page/about");

        let (_, body) = call_json(&router, "GET", "/api/sites/demo/menus/footer/raw", None).await;
        assert_eq!(body["nodes"][0], json!({"type": "url", "data": {"url": "/a", "label": "A"}, "links": []}));

        let (status, body) = call_json(
            &router,
            "PUT",
            "/api/sites/demo/menus/footer",
            Some(json!({"name": "Bottom", "tree": []})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slug"], "bottom");

        let (status, _) = call_json(&router, "GET", "/api/sites/demo/menus/footer", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let router = router();
        call(&router, "POST", "/api/sites/demo/menus", Some(footer_tree())).await;

        let (status, body) =
            call_json(&router, "DELETE", "/api/sites/demo/menus/footer", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Confirmation required");

        let (status, _) = call_json(&router, "GET", "/api/sites/demo/menus/footer/raw", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call_json(
            &router,
            "DELETE",
            "/api/sites/demo/menus/footer?confirm=true",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call_json(&router, "GET", "/api/sites/demo/menus/footer/raw", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reserved_name_warns() {
        let router = router();

        let (status, body) = call_json(
            &router,
            "POST",
            "/api/sites/demo/menus",
            Some(json!({"name": "Edit", "tree": []})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["slug"].as_str().unwrap().starts_with("edit-"));
        assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_tree_is_rejected() {
        let router = router();

        let (status, body) = call_json(
            &router,
            "POST",
            "/api/sites/demo/menus",
            Some(json!({
                "name": "main",
                "tree": [{"text": "X", "data": {"type": "resource", "data": {}}, "children": []}]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"][0]["field"], "tree[0].id");
        let (_, body) = call_json(&router, "GET", "/api/sites/demo/menus", None).await;
        assert_eq!(body["menus"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_site() {
        let router = router();

        let (status, body) = call_json(&router, "GET", "/api/sites/nope/menus", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["site"], "nope");
    }

    #[tokio::test]
    async fn test_rendered_menu() {
        let router = router();
        call(&router, "POST", "/api/sites/demo/menus", Some(footer_tree())).await;

        let (status, html) = call(
            &router,
            "GET",
            "/sites/demo/menus/footer?active=%2Fs%2Fdemo%2Fpage%2Fabout&class=footer",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            html,
            "<ul class=\"footer\"><li><a href=\"/a\">A</a></li>\
             <li class=\"active\"><a href=\"/s/demo/page/about\">About us</a></li></ul>"
        );
    }

    #[tokio::test]
    async fn test_rendered_navigation_falls_back_to_home() {
        let router = router();

        let (status, html) = call(&router, "GET", "/sites/demo/navigation", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            html,
            "<ul class=\"navigation\"><li><a href=\"/s/demo\">Home</a></li></ul>"
        );
    }

    #[tokio::test]
    async fn test_rendered_breadcrumbs_for_item() {
        let router = router();

        let (status, html) =
            call(&router, "GET", "/sites/demo/breadcrumbs?resource=7&separator=%3E", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.starts_with("<div class=\"breadcrumbs-parent\">"));
        assert!(html.contains(
            "<a href=\"/s/demo\">Home</a> &gt; \
             <a href=\"/s/demo/item-set\">Collections</a> &gt; \
             <a href=\"/s/demo/item-set/5\">Maps</a> &gt; Old map"
        ));
    }

    #[tokio::test]
    async fn test_breadcrumbs_suppressed_on_home_page() {
        let router = router();

        let (status, html) = call(&router, "GET", "/sites/demo/breadcrumbs?route=site", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(html, "");
    }

    #[tokio::test]
    async fn test_breadcrumbs_unknown_resource_falls_back_to_route() {
        let router = router();

        let (status, html) = call(
            &router,
            "GET",
            "/sites/demo/breadcrumbs?resource=99&route=site/resource&controller=item",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<a href=\"/s/demo\">Home</a>"));
        assert!(html.contains("Items"));
    }

    #[tokio::test]
    async fn test_breadcrumb_query_overrides_site_settings() {
        let (router, settings) = router_with_settings();
        settings
            .set(
                Scope::Site(1),
                CRUMBS_KEY,
                json!(["home", "collections", "current"]),
            )
            .unwrap();
        let uri = "/sites/demo/breadcrumbs?route=site/resource&controller=item";

        let (_, stored) = call(&router, "GET", uri, None).await;
        let (status, overridden) =
            call(&router, "GET", &format!("{uri}&crumbs=home,current"), None).await;

        assert!(stored.contains(">Collections</a>"));
        assert_eq!(status, StatusCode::OK);
        assert!(!overridden.contains("Collections"));
        assert!(overridden.contains(">Home</a>"));
        assert!(overridden.contains("Items"));
    }

    #[tokio::test]
    async fn test_homepage_override_shows_home_trail() {
        let router = router();

        let (_, html) = call(
            &router,
            "GET",
            "/sites/demo/breadcrumbs?route=site&homepage=true&link_last=true&min_depth=0",
            None,
        )
        .await;

        assert!(html.contains("<a href=\"/s/demo\">Home</a>"));
    }

    #[tokio::test]
    async fn test_rendered_resource_menu() {
        let (router, settings) = router_with_settings();

        let (status, html) = call(&router, "GET", "/sites/demo/resource-menu", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(html, "");

        call(&router, "POST", "/api/sites/demo/menus", Some(footer_tree())).await;
        settings
            .set(Scope::Site(1), RESOURCE_MENU_KEY, json!("footer"))
            .unwrap();

        let (status, html) = call(&router, "GET", "/sites/demo/resource-menu", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.starts_with("<ul class=\"navigation\"><li><a href=\"/a\">A</a></li>"));
    }

    #[tokio::test]
    async fn test_security_headers() {
        let router = router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/sites/demo/navigation")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }
}
