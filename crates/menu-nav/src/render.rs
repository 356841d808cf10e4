//! HTML rendering of menus and breadcrumb trails.
//!
//! # Architecture
//!
//! Rendering works on the render-ready shapes only: [`NavPage`] trees from
//! [`NavigationTranslator`] and [`BreadcrumbTrail`]s from
//! [`ContainerBuilder`](crate::ContainerBuilder). Labels and URLs are
//! escaped here; the shapes themselves hold raw text.
//!
//! Menu markup is produced by a [`MenuTemplate`]. [`ListTemplate`] is the
//! default nested `<ul>` rendering; themes can supply their own template
//! through [`MenuRenderOptions::template`].

use std::fmt::{self, Write};
use std::sync::Arc;

use crate::breadcrumb::BreadcrumbTrail;
use crate::context::Site;
use crate::menus::{MenuError, MenuRepository};
use crate::node::{NavNode, NavPage};
use crate::translator::ActiveSelector;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Produces menu markup from render-ready pages.
pub trait MenuTemplate: Send + Sync {
    /// Render `pages` as a menu.
    fn render(&self, pages: &[NavPage], options: &MenuRenderOptions) -> String;
}

/// Options for [`render_menu`] and [`render_named_menu`].
#[derive(Clone)]
pub struct MenuRenderOptions {
    /// Render a menu of this site instead of the current one.
    pub site: Option<Site>,
    /// Render these nodes instead of the stored menu.
    pub pages: Option<Vec<NavNode>>,
    /// How active pages are chosen.
    pub active: ActiveSelector,
    /// Request path used when a page's active flag is unset.
    pub current_path: Option<String>,
    /// Deepest level rendered in branches without an active page
    /// (0 = top level only).
    pub max_depth: Option<usize>,
    /// Deepest level rendered in the branch holding the active page.
    /// Defaults to `max_depth`.
    pub active_max_depth: Option<usize>,
    /// Only expand the path to the active page.
    pub only_active_branch: bool,
    /// Class of the outer `<ul>`.
    pub ul_class: String,
    /// Class of active `<li>` elements.
    pub li_active_class: String,
    /// Markup producer, [`ListTemplate`] when unset.
    pub template: Option<Arc<dyn MenuTemplate>>,
}

impl Default for MenuRenderOptions {
    fn default() -> Self {
        Self {
            site: None,
            pages: None,
            active: ActiveSelector::Framework,
            current_path: None,
            max_depth: None,
            active_max_depth: None,
            only_active_branch: false,
            ul_class: "navigation".to_owned(),
            li_active_class: "active".to_owned(),
            template: None,
        }
    }
}

impl fmt::Debug for MenuRenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuRenderOptions")
            .field("site", &self.site.as_ref().map(|site| &site.slug))
            .field("active", &self.active)
            .field("current_path", &self.current_path)
            .field("max_depth", &self.max_depth)
            .field("active_max_depth", &self.active_max_depth)
            .field("only_active_branch", &self.only_active_branch)
            .field("ul_class", &self.ul_class)
            .field("li_active_class", &self.li_active_class)
            .field("template", &self.template.is_some())
            .finish_non_exhaustive()
    }
}

impl MenuRenderOptions {
    /// Whether a page is active, falling back to the request path when the
    /// page's flag is unset.
    #[must_use]
    pub fn is_active(&self, page: &NavPage) -> bool {
        page.active.unwrap_or_else(|| {
            !page.href.is_empty() && self.current_path.as_deref() == Some(page.href.as_str())
        })
    }

    /// Whether a page or any of its descendants is active.
    #[must_use]
    pub fn contains_active(&self, page: &NavPage) -> bool {
        self.is_active(page) || page.pages.iter().any(|child| self.contains_active(child))
    }
}

/// Nested `<ul>` menu markup.
///
/// Hidden pages and their subtrees are skipped. Pages without a URL render
/// as `<span>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListTemplate;

impl MenuTemplate for ListTemplate {
    fn render(&self, pages: &[NavPage], options: &MenuRenderOptions) -> String {
        if options.only_active_branch && !pages.iter().any(|page| options.contains_active(page))
        {
            return String::new();
        }

        let mut html = String::new();
        for page in pages.iter().filter(|page| page.visible) {
            let limit = if options.contains_active(page) {
                options.active_max_depth.or(options.max_depth)
            } else {
                options.max_depth
            };
            render_item(&mut html, page, 0, limit, options);
        }
        if html.is_empty() {
            return html;
        }
        format!(
            "<ul class=\"{}\">{html}</ul>",
            escape_html(&options.ul_class)
        )
    }
}

fn render_item(
    html: &mut String,
    page: &NavPage,
    depth: usize,
    limit: Option<usize>,
    options: &MenuRenderOptions,
) {
    if options.is_active(page) {
        let _ = write!(html, "<li class=\"{}\">", escape_html(&options.li_active_class));
    } else {
        html.push_str("<li>");
    }

    let label = escape_html(&page.label);
    let class = page
        .class
        .as_deref()
        .map(|class| format!(" class=\"{}\"", escape_html(class)))
        .unwrap_or_default();
    if page.href.is_empty() {
        let _ = write!(html, "<span{class}>{label}</span>");
    } else {
        let _ = write!(
            html,
            "<a href=\"{}\"{class}>{label}</a>",
            escape_html(&page.href)
        );
    }

    let expand = limit.is_none_or(|limit| depth < limit)
        && (!options.only_active_branch || options.contains_active(page));
    if expand {
        let mut children = String::new();
        for child in page.pages.iter().filter(|child| child.visible) {
            render_item(&mut children, child, depth + 1, limit, options);
        }
        if !children.is_empty() {
            let _ = write!(html, "<ul>{children}</ul>");
        }
    }
    html.push_str("</li>");
}

/// Render pages with the options' template.
#[must_use]
pub fn render_menu(pages: &[NavPage], options: &MenuRenderOptions) -> String {
    match &options.template {
        Some(template) => template.render(pages, options),
        None => ListTemplate.render(pages, options),
    }
}

/// Render a stored menu, or the site navigation when `name` is `None`.
///
/// `options.site` and `options.pages` replace the site and the stored
/// nodes.
///
/// # Errors
///
/// Returns [`MenuError::NotFound`] if the named menu does not exist,
/// [`MenuError::Translate`] if the tree holds an unknown link type and
/// [`MenuError::Settings`] if the menu cannot be read.
pub fn render_named_menu(
    menus: &MenuRepository,
    site: &Site,
    name: Option<&str>,
    options: &MenuRenderOptions,
) -> Result<String, MenuError> {
    let site = options.site.as_ref().unwrap_or(site);
    let translator = menus.translator();

    let pages = match (&options.pages, name) {
        (Some(nodes), _) => translator.to_navigation(site, nodes, &options.active)?,
        (None, Some(name)) => {
            let nodes = menus
                .get(site.id, name)?
                .ok_or_else(|| MenuError::NotFound(name.to_owned()))?;
            translator.to_navigation(site, &nodes, &options.active)?
        }
        (None, None) => translator.site_navigation(site, &options.active)?,
    };
    Ok(render_menu(&pages, options))
}

/// Render the menu selected for resource pages.
///
/// Returns an empty string when no menu is selected or the selected menu
/// no longer exists.
///
/// # Errors
///
/// Returns [`MenuError::Translate`] if the tree holds an unknown link type
/// and [`MenuError::Settings`] if the settings cannot be read.
pub fn render_resource_menu(
    menus: &MenuRepository,
    site: &Site,
    options: &MenuRenderOptions,
) -> Result<String, MenuError> {
    let site = options.site.as_ref().unwrap_or(site);
    let Some((slug, nodes)) = menus.resource_menu(site.id)? else {
        return Ok(String::new());
    };
    tracing::debug!(site = site.id, slug = %slug, "Rendering resource menu");
    let pages = menus
        .translator()
        .to_navigation(site, &nodes, &options.active)?;
    Ok(render_menu(&pages, options))
}

/// Options for [`render_breadcrumbs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreadcrumbRenderOptions {
    /// Text between crumbs, padded with one space on each side.
    pub separator: String,
    /// Link the last crumb too.
    pub link_last: bool,
    /// Minimum depth of the last crumb (root = 0) for anything to render.
    pub min_depth: usize,
}

impl Default for BreadcrumbRenderOptions {
    fn default() -> Self {
        Self {
            separator: String::new(),
            link_last: false,
            min_depth: 1,
        }
    }
}

/// Render a breadcrumb trail.
///
/// Returns an empty string for an empty trail or one shallower than
/// `options.min_depth`.
#[must_use]
pub fn render_breadcrumbs(trail: &BreadcrumbTrail, options: &BreadcrumbRenderOptions) -> String {
    let path = trail.path();
    if path.len() <= options.min_depth {
        return String::new();
    }

    let separator = format!(" {} ", escape_html(&options.separator));
    let last = path.len() - 1;
    let crumbs: Vec<String> = path
        .iter()
        .enumerate()
        .map(|(index, crumb)| {
            let label = escape_html(&crumb.label);
            if crumb.uri.is_empty() || (index == last && !options.link_last) {
                if index == last {
                    label
                } else {
                    format!("<span>{label}</span>")
                }
            } else {
                format!("<a href=\"{}\">{label}</a>", escape_html(&crumb.uri))
            }
        })
        .collect();

    format!(
        "<div class=\"breadcrumbs-parent\"><nav id=\"breadcrumb\" class=\"breadcrumbs\" \
         aria-label=\"Breadcrumb\">{}</nav></div>",
        crumbs.join(&separator)
    )
}
