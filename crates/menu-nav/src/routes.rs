//! Public site routes.
//!
//! [`DefaultRoutes`] is a [`UrlGenerator`] for the standard public route
//! table:
//!
//! | Route              | Path                                        |
//! |--------------------|---------------------------------------------|
//! | `top`              | `/`                                         |
//! | `site`             | `/s/{site-slug}`                            |
//! | `site/page`        | `/s/{site-slug}/page/{page-slug}`           |
//! | `site/resource`    | `/s/{site-slug}/{controller}[/{action}]`    |
//! | `site/resource-id` | `/s/{site-slug}/{controller}/{id}[/{action}]` |
//! | `site/item-set`    | `/s/{site-slug}/item-set/{item-set-id}`     |
//!
//! Optional segments are omitted when they hold the route default
//! (`browse` and `show`).

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::context::UrlGenerator;

/// Site root route.
pub const ROUTE_SITE: &str = "site";
/// Installation root route.
pub const ROUTE_TOP: &str = "top";
/// Static page route.
pub const ROUTE_PAGE: &str = "site/page";
/// Resource listing route.
pub const ROUTE_RESOURCE: &str = "site/resource";
/// Single resource route.
pub const ROUTE_RESOURCE_ID: &str = "site/resource-id";
/// Items of an item set route.
pub const ROUTE_ITEM_SET: &str = "site/item-set";

/// Parameter filled with the current site slug.
pub const PARAM_SITE_SLUG: &str = "site-slug";

/// Characters escaped in a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped in a query key or value.
const QUERY: &AsciiSet = &SEGMENT.add(b'&').add(b'=').add(b'+');

/// URL generator for the public route table.
#[derive(Clone, Debug, Default)]
pub struct DefaultRoutes {
    base_path: String,
}

impl DefaultRoutes {
    /// Routes mounted at `/`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes mounted under a base path (e.g. `/omeka`).
    #[must_use]
    pub fn with_base_path(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_owned(),
        }
    }

    fn path(&self, route: &str, params: &BTreeMap<String, String>) -> Option<String> {
        let param = |key: &str| {
            params
                .get(key)
                .filter(|value| !value.is_empty())
                .map(|value| utf8_percent_encode(value, SEGMENT).to_string())
        };
        let optional = |key: &str, default: &str| match params.get(key) {
            Some(value) if !value.is_empty() && value != default => {
                format!("/{}", utf8_percent_encode(value, SEGMENT))
            }
            _ => String::new(),
        };

        if route == ROUTE_TOP {
            return Some("/".to_owned());
        }

        let site = format!("/s/{}", param(PARAM_SITE_SLUG)?);
        let path = match route {
            ROUTE_SITE => site,
            ROUTE_PAGE => format!("{site}/page/{}", param("page-slug")?),
            ROUTE_RESOURCE => format!(
                "{site}/{}{}",
                param("controller")?,
                optional("action", "browse")
            ),
            ROUTE_RESOURCE_ID => format!(
                "{site}/{}/{}{}",
                param("controller")?,
                param("id")?,
                optional("action", "show")
            ),
            ROUTE_ITEM_SET => format!("{site}/item-set/{}", param("item-set-id")?),
            _ => return None,
        };
        Some(path)
    }
}

impl UrlGenerator for DefaultRoutes {
    fn assemble(
        &self,
        route: &str,
        params: &BTreeMap<String, String>,
        query: &BTreeMap<String, String>,
    ) -> Option<String> {
        let mut url = format!("{}{}", self.base_path, self.path(route, params)?);
        if !query.is_empty() {
            let pairs: Vec<String> = query
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(key, QUERY),
                        utf8_percent_encode(value, QUERY)
                    )
                })
                .collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        Some(url)
    }
}
