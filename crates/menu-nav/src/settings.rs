//! Site settings read by menus and breadcrumbs.
//!
//! Breadcrumb options are layered: the defaults passed in by the caller
//! (usually the configuration file), then global-scoped keys, then
//! site-scoped keys, then per-call [`BreadcrumbOverrides`].

use menu_settings::{Scope, SettingsError, SettingsStore, SiteId};
use serde_json::Value;

use crate::breadcrumb::{BreadcrumbOptions, PrependLink};

/// Prefix of menu keys: `menu_menu:<slug>`.
pub const MENU_KEY_PREFIX: &str = "menu_menu:";
/// Enabled crumb names.
pub const CRUMBS_KEY: &str = "menu_breadcrumbs_crumbs";
/// Prepended links.
pub const PREPEND_KEY: &str = "menu_breadcrumbs_prepend";
/// Collections URL override.
pub const COLLECTIONS_URL_KEY: &str = "menu_breadcrumbs_collections_url";
/// Crumb separator.
pub const SEPARATOR_KEY: &str = "menu_breadcrumbs_separator";
/// Show breadcrumbs on the home page.
pub const HOMEPAGE_KEY: &str = "menu_breadcrumbs_homepage";
/// Property selecting the primary item set.
pub const PROPERTY_ITEMSET_KEY: &str = "menu_breadcrumbs_property_itemset";
/// Menu shown on resource pages.
pub const RESOURCE_MENU_KEY: &str = "menu_resource_menu";

/// Settings key of a menu.
#[must_use]
pub fn menu_key(slug: &str) -> String {
    format!("{MENU_KEY_PREFIX}{slug}")
}

/// Per-call breadcrumb options; every field left `None` keeps the value
/// read from settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BreadcrumbOverrides {
    /// Enable exactly these crumbs.
    pub crumbs: Option<Vec<String>>,
    /// Links inserted after Home.
    pub prepend: Option<Vec<PrependLink>>,
    /// Collections URL.
    pub collections_url: Option<String>,
    /// Crumb separator.
    pub separator: Option<String>,
    /// Build a trail on the home page too.
    pub homepage: Option<bool>,
    /// Property selecting the primary item set.
    pub property_itemset: Option<String>,
}

impl BreadcrumbOverrides {
    /// Whether no option is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl BreadcrumbOptions {
    /// Read a site's breadcrumb options.
    ///
    /// Global keys apply first and site keys win over them. When the crumbs
    /// setting is a list, crumb names missing from it are disabled rather
    /// than defaulted.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the settings store fails.
    pub fn from_settings(
        settings: &dyn SettingsStore,
        site: SiteId,
        defaults: &Self,
    ) -> Result<Self, SettingsError> {
        let mut options = defaults.clone();
        options.apply_scope(settings, Scope::Global)?;
        options.apply_scope(settings, Scope::Site(site))?;
        Ok(options)
    }

    /// Read a site's breadcrumb options and apply per-call overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the settings store fails.
    pub fn resolve(
        settings: &dyn SettingsStore,
        site: SiteId,
        defaults: &Self,
        overrides: &BreadcrumbOverrides,
    ) -> Result<Self, SettingsError> {
        Ok(Self::from_settings(settings, site, defaults)?.with_overrides(overrides))
    }

    /// Replace every option set in `overrides`.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &BreadcrumbOverrides) -> Self {
        if let Some(crumbs) = &overrides.crumbs {
            self.set_crumbs(crumbs.as_slice());
        }
        if let Some(prepend) = &overrides.prepend {
            self.prepend.clone_from(prepend);
        }
        if let Some(url) = &overrides.collections_url {
            self.collections_url.clone_from(url);
        }
        if let Some(separator) = &overrides.separator {
            self.separator.clone_from(separator);
        }
        if let Some(homepage) = overrides.homepage {
            self.homepage = homepage;
        }
        if let Some(property) = &overrides.property_itemset {
            self.property_itemset.clone_from(property);
        }
        self
    }

    fn apply_scope(
        &mut self,
        settings: &dyn SettingsStore,
        scope: Scope,
    ) -> Result<(), SettingsError> {
        match settings.get(scope, CRUMBS_KEY)? {
            Some(Value::Array(names)) => {
                let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
                self.set_crumbs(&names);
            }
            Some(Value::Object(flags)) => {
                let flag = |name: &str, current: bool| {
                    flags.get(name).map_or(current, truthy)
                };
                self.home = flag("home", self.home);
                self.collections = flag("collections", self.collections);
                self.itemset = flag("itemset", self.itemset);
                self.itemsetstree = flag("itemsetstree", self.itemsetstree);
                self.current = flag("current", self.current);
            }
            _ => {}
        }

        match settings.get(scope, PREPEND_KEY)? {
            Some(Value::Array(entries)) => {
                self.prepend = entries
                    .iter()
                    .filter_map(|entry| {
                        let uri = entry.get("uri")?.as_str()?;
                        let label = entry.get("label").and_then(Value::as_str).unwrap_or(uri);
                        Some(PrependLink {
                            uri: uri.to_owned(),
                            label: label.to_owned(),
                        })
                    })
                    .collect();
            }
            Some(Value::String(text)) => self.prepend = parse_prepend_lines(&text),
            _ => {}
        }

        if let Some(value) = read_string(settings, scope, COLLECTIONS_URL_KEY)? {
            self.collections_url = value;
        }
        if let Some(value) = read_string(settings, scope, SEPARATOR_KEY)? {
            self.separator = value;
        }
        if let Some(value) = read_string(settings, scope, PROPERTY_ITEMSET_KEY)? {
            self.property_itemset = value;
        }
        if let Some(value) = settings.get(scope, HOMEPAGE_KEY)? {
            self.homepage = truthy(&value);
        }

        Ok(())
    }
}

fn read_string(
    settings: &dyn SettingsStore,
    scope: Scope,
    key: &str,
) -> Result<Option<String>, SettingsError> {
    Ok(settings
        .get(scope, key)?
        .and_then(|value| value.as_str().map(str::to_owned)))
}

/// Loose boolean: `true`, non-zero numbers and strings other than `""`,
/// `"0"` and `"false"`.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > f64::EPSILON),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Parse prepended links from text, one `uri label` pair per line.
///
/// The label is everything after the first space and defaults to the uri.
/// Blank lines are dropped.
#[must_use]
pub fn parse_prepend_lines(text: &str) -> Vec<PrependLink> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (uri, label) = line.split_once(' ').unwrap_or((line, ""));
            let label = match label.trim() {
                "" => uri,
                label => label,
            };
            PrependLink {
                uri: uri.to_owned(),
                label: label.to_owned(),
            }
        })
        .collect()
}

/// Format prepended links as text, the inverse of [`parse_prepend_lines`].
#[must_use]
pub fn format_prepend_lines(links: &[PrependLink]) -> String {
    links
        .iter()
        .map(|link| format!("{} {}\n", link.uri, link.label))
        .collect()
}

/// Slug of the menu selected for resource pages, if any.
///
/// # Errors
///
/// Returns [`SettingsError`] if the settings store fails.
pub fn resource_menu(
    settings: &dyn SettingsStore,
    site: SiteId,
) -> Result<Option<String>, SettingsError> {
    Ok(read_string(settings, Scope::Site(site), RESOURCE_MENU_KEY)?
        .filter(|slug| !slug.is_empty()))
}

#[cfg(test)]
mod tests {
    use menu_settings::MemorySettings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_missing_settings_use_defaults() {
        let settings = MemorySettings::new();
        let defaults = BreadcrumbOptions {
            separator: "/".to_owned(),
            ..BreadcrumbOptions::default()
        };

        let options = BreadcrumbOptions::from_settings(&settings, 1, &defaults).unwrap();

        assert_eq!(options, defaults);
    }

    #[test]
    fn test_crumb_list_disables_unlisted() {
        let settings = MemorySettings::new().with_value(
            Scope::Site(1),
            CRUMBS_KEY,
            json!(["home", "current"]),
        );

        let options =
            BreadcrumbOptions::from_settings(&settings, 1, &BreadcrumbOptions::default()).unwrap();

        assert!(options.home);
        assert!(options.current);
        assert!(!options.collections);
        assert!(!options.itemset);
        assert!(!options.itemsetstree);
    }

    #[test]
    fn test_crumb_map_keeps_unlisted_defaults() {
        let settings = MemorySettings::new().with_value(
            Scope::Site(1),
            CRUMBS_KEY,
            json!({"collections": false}),
        );

        let options =
            BreadcrumbOptions::from_settings(&settings, 1, &BreadcrumbOptions::default()).unwrap();

        assert!(!options.collections);
        assert!(options.home);
    }

    #[test]
    fn test_site_scalars_override_defaults() {
        let settings = MemorySettings::new()
            .with_value(Scope::Site(2), SEPARATOR_KEY, json!(">"))
            .with_value(Scope::Site(2), HOMEPAGE_KEY, json!("1"))
            .with_value(Scope::Site(2), COLLECTIONS_URL_KEY, json!("/s/demo/page/all"))
            .with_value(Scope::Site(2), PROPERTY_ITEMSET_KEY, json!("dcterms:isPartOf"))
            .with_value(
                Scope::Site(2),
                PREPEND_KEY,
                json!([{"uri": "https://library.org", "label": "Library"}, {"uri": "/x"}]),
            )
            .with_value(Scope::Site(3), SEPARATOR_KEY, json!("|"));

        let options =
            BreadcrumbOptions::from_settings(&settings, 2, &BreadcrumbOptions::default()).unwrap();

        assert_eq!(options.separator, ">");
        assert!(options.homepage);
        assert_eq!(options.collections_url, "/s/demo/page/all");
        assert_eq!(options.property_itemset, "dcterms:isPartOf");
        assert_eq!(
            options.prepend,
            vec![
                PrependLink {
                    uri: "https://library.org".to_owned(),
                    label: "Library".to_owned(),
                },
                PrependLink {
                    uri: "/x".to_owned(),
                    label: "/x".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_site_settings_win_over_global() {
        let settings = MemorySettings::new()
            .with_value(Scope::Global, SEPARATOR_KEY, json!("/"))
            .with_value(Scope::Global, HOMEPAGE_KEY, json!(true))
            .with_value(Scope::Global, CRUMBS_KEY, json!(["home", "current"]))
            .with_value(Scope::Site(1), SEPARATOR_KEY, json!(">"));

        let site_one =
            BreadcrumbOptions::from_settings(&settings, 1, &BreadcrumbOptions::default()).unwrap();
        let site_two =
            BreadcrumbOptions::from_settings(&settings, 2, &BreadcrumbOptions::default()).unwrap();

        assert_eq!(site_one.separator, ">");
        assert!(site_one.homepage);
        assert_eq!(site_one.crumbs(), vec!["home", "current"]);
        assert_eq!(site_two.separator, "/");
    }

    #[test]
    fn test_overrides_win_over_site_settings() {
        let settings = MemorySettings::new()
            .with_value(Scope::Site(1), CRUMBS_KEY, json!(["home", "collections", "current"]))
            .with_value(Scope::Site(1), COLLECTIONS_URL_KEY, json!("/all"))
            .with_value(Scope::Site(1), SEPARATOR_KEY, json!(">"));
        let overrides = BreadcrumbOverrides {
            crumbs: Some(vec!["home".to_owned()]),
            homepage: Some(true),
            property_itemset: Some("dcterms:isPartOf".to_owned()),
            ..BreadcrumbOverrides::default()
        };

        let options = BreadcrumbOptions::resolve(
            &settings,
            1,
            &BreadcrumbOptions::default(),
            &overrides,
        )
        .unwrap();

        assert_eq!(options.crumbs(), vec!["home"]);
        assert!(options.homepage);
        assert_eq!(options.property_itemset, "dcterms:isPartOf");
        assert_eq!(options.collections_url, "/all");
        assert_eq!(options.separator, ">");
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let overrides = BreadcrumbOverrides::default();
        let options = BreadcrumbOptions {
            separator: "|".to_owned(),
            ..BreadcrumbOptions::default()
        };

        assert!(overrides.is_empty());
        assert_eq!(options.clone().with_overrides(&overrides), options);
    }

    #[test]
    fn test_parse_prepend_lines() {
        let links = parse_prepend_lines("https://library.org  Main library\n\n  /about\r\n");

        assert_eq!(
            links,
            vec![
                PrependLink {
                    uri: "https://library.org".to_owned(),
                    label: "Main library".to_owned(),
                },
                PrependLink {
                    uri: "/about".to_owned(),
                    label: "/about".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_format_prepend_lines_parses_back() {
        let links = parse_prepend_lines("/a First link\n/b Second\n");

        assert_eq!(format_prepend_lines(&links), "/a First link\n/b Second\n");
    }

    #[test]
    fn test_resource_menu_ignores_empty() {
        let settings = MemorySettings::new()
            .with_value(Scope::Site(1), RESOURCE_MENU_KEY, json!("main"))
            .with_value(Scope::Site(2), RESOURCE_MENU_KEY, json!(""));

        assert_eq!(resource_menu(&settings, 1).unwrap().as_deref(), Some("main"));
        assert_eq!(resource_menu(&settings, 2).unwrap(), None);
        assert_eq!(resource_menu(&settings, 3).unwrap(), None);
    }

    #[test]
    fn test_menu_key() {
        assert_eq!(menu_key("footer"), "menu_menu:footer");
    }
}
