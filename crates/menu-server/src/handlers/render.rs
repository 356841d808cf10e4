//! Public rendering endpoints.
//!
//! Return HTML fragments for a site's menus and breadcrumb trail, for
//! themes that embed them server-side.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use menu_nav::{
    ActiveSelector, BreadcrumbOptions, BreadcrumbOverrides, BreadcrumbRenderOptions,
    MenuRenderOptions, ResourceApi, RouteMatch, parse_prepend_lines, render_breadcrumbs,
    render_named_menu, render_resource_menu,
};
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Query of GET /sites/{site}/menus/{slug}.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MenuQuery {
    /// `false` for no active page, `true` to match `path`, or a URL.
    active: Option<String>,
    /// Current request path.
    path: Option<String>,
    max_depth: Option<usize>,
    active_max_depth: Option<usize>,
    #[serde(default)]
    only_active_branch: bool,
    /// Class of the outer list.
    class: Option<String>,
}

impl MenuQuery {
    fn into_options(self) -> Result<MenuRenderOptions, ServerError> {
        let active = match self.active.as_deref() {
            None => ActiveSelector::Framework,
            Some("false") => ActiveSelector::Inactive,
            Some("true") => {
                let path = self.path.clone().ok_or_else(|| {
                    ServerError::BadRequest("active=true requires a path".to_owned())
                })?;
                ActiveSelector::Current(path)
            }
            Some(url) => ActiveSelector::Url(url.to_owned()),
        };

        let mut options = MenuRenderOptions {
            active,
            current_path: self.path,
            max_depth: self.max_depth,
            active_max_depth: self.active_max_depth,
            only_active_branch: self.only_active_branch,
            ..MenuRenderOptions::default()
        };
        if let Some(class) = self.class {
            options.ul_class = class;
        }
        Ok(options)
    }
}

/// Query of GET /sites/{site}/breadcrumbs.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BreadcrumbQuery {
    /// Matched route name.
    route: Option<String>,
    /// Current resource id.
    resource: Option<u64>,
    #[serde(rename = "page-slug")]
    page_slug: Option<String>,
    #[serde(rename = "item-set-id")]
    item_set_id: Option<String>,
    controller: Option<String>,
    action: Option<String>,
    /// Comma-separated crumb names, replacing the site's crumbs.
    crumbs: Option<String>,
    /// Prepended links, one `uri label` pair per line.
    prepend: Option<String>,
    collections_url: Option<String>,
    separator: Option<String>,
    homepage: Option<bool>,
    property_itemset: Option<String>,
    #[serde(default)]
    link_last: bool,
    min_depth: Option<usize>,
}

impl BreadcrumbQuery {
    fn overrides(&self) -> BreadcrumbOverrides {
        BreadcrumbOverrides {
            crumbs: self.crumbs.as_deref().map(|crumbs| {
                crumbs
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                    .collect()
            }),
            prepend: self.prepend.as_deref().map(parse_prepend_lines),
            collections_url: self.collections_url.clone(),
            separator: self.separator.clone(),
            homepage: self.homepage,
            property_itemset: self.property_itemset.clone(),
        }
    }

    fn route(&self) -> Option<RouteMatch> {
        let name = self.route.as_deref()?;
        let params = [
            ("page-slug", &self.page_slug),
            ("item-set-id", &self.item_set_id),
            ("controller", &self.controller),
            ("action", &self.action),
        ];
        Some(
            params
                .into_iter()
                .fold(RouteMatch::new(name), |route, (key, value)| match value {
                    Some(value) => route.with_param(key, value.as_str()),
                    None => route,
                }),
        )
    }
}

/// Handle GET /sites/{site}/menus/{slug}.
pub(crate) async fn get_rendered_menu(
    Path((site, slug)): Path<(String, String)>,
    Query(query): Query<MenuQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let site = state.site(&site)?;
    let options = query.into_options()?;
    let html = render_named_menu(&state.menus, site, Some(&slug), &options)?;
    Ok(Html(html))
}

/// Handle GET /sites/{site}/navigation.
pub(crate) async fn get_rendered_navigation(
    Path(site): Path<String>,
    Query(query): Query<MenuQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let site = state.site(&site)?;
    let options = query.into_options()?;
    let html = render_named_menu(&state.menus, site, None, &options)?;
    Ok(Html(html))
}

/// Handle GET /sites/{site}/resource-menu.
///
/// Renders the menu selected for resource pages; empty when none is.
pub(crate) async fn get_rendered_resource_menu(
    Path(site): Path<String>,
    Query(query): Query<MenuQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let site = state.site(&site)?;
    let options = query.into_options()?;
    let html = render_resource_menu(&state.menus, site, &options)?;
    Ok(Html(html))
}

/// Handle GET /sites/{site}/breadcrumbs.
pub(crate) async fn get_rendered_breadcrumbs(
    Path(site): Path<String>,
    Query(query): Query<BreadcrumbQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let site = state.site(&site)?;
    let resource = query.resource.and_then(|id| {
        let resource = state.catalog.read(id);
        if resource.is_none() {
            tracing::warn!(site = %site.slug, resource = id, "Breadcrumb resource not found");
        }
        resource
    });

    let options = BreadcrumbOptions::resolve(
        state.menus.settings().as_ref(),
        site.id,
        &state.breadcrumb_defaults,
        &query.overrides(),
    )?;
    let route = query.route();
    let trail = state
        .breadcrumbs
        .build(site, route.as_ref(), resource.as_ref(), &options);

    let render = BreadcrumbRenderOptions {
        separator: options.separator,
        link_last: query.link_last,
        min_depth: query
            .min_depth
            .unwrap_or(BreadcrumbRenderOptions::default().min_depth),
    };
    Ok(Html(render_breadcrumbs(&trail, &render)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_menu_query_active_selector() {
        let options = |active: Option<&str>, path: Option<&str>| {
            MenuQuery {
                active: active.map(str::to_owned),
                path: path.map(str::to_owned),
                ..MenuQuery::default()
            }
            .into_options()
        };

        assert_eq!(options(None, None).unwrap().active, ActiveSelector::Framework);
        assert_eq!(options(Some("false"), None).unwrap().active, ActiveSelector::Inactive);
        assert_eq!(
            options(Some("true"), Some("/s/demo")).unwrap().active,
            ActiveSelector::Current("/s/demo".to_owned())
        );
        assert_eq!(
            options(Some("/about"), None).unwrap().active,
            ActiveSelector::Url("/about".to_owned())
        );
        assert!(matches!(options(Some("true"), None), Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn test_menu_query_class_override() {
        let options = MenuQuery {
            class: Some("top-nav".to_owned()),
            max_depth: Some(1),
            ..MenuQuery::default()
        }
        .into_options()
        .unwrap();

        assert_eq!(options.ul_class, "top-nav");
        assert_eq!(options.li_active_class, "active");
        assert_eq!(options.max_depth, Some(1));
    }

    #[test]
    fn test_breadcrumb_query_route_params() {
        let query = BreadcrumbQuery {
            route: Some("site/resource".to_owned()),
            controller: Some("item".to_owned()),
            action: Some("search".to_owned()),
            ..BreadcrumbQuery::default()
        };

        let route = query.route().unwrap();

        assert_eq!(route.name, "site/resource");
        assert_eq!(route.param("controller"), Some("item"));
        assert_eq!(route.param("action"), Some("search"));
        assert_eq!(route.param("page-slug"), None);
        assert!(BreadcrumbQuery::default().route().is_none());
    }

    #[test]
    fn test_breadcrumb_query_overrides() {
        let query = BreadcrumbQuery {
            crumbs: Some("home, current,".to_owned()),
            prepend: Some("/library Library".to_owned()),
            homepage: Some(false),
            ..BreadcrumbQuery::default()
        };

        let overrides = query.overrides();

        assert_eq!(
            overrides.crumbs,
            Some(vec!["home".to_owned(), "current".to_owned()])
        );
        assert_eq!(overrides.prepend.unwrap()[0].label, "Library");
        assert_eq!(overrides.homepage, Some(false));
        assert_eq!(overrides.separator, None);
        assert!(BreadcrumbQuery::default().overrides().is_empty());
    }
}
