//! Built-in link types: `url`, `page`, `resource` and `structure`.

use serde_json::Value;

use crate::context::LinkContext;
use crate::error::FieldError;
use crate::link::{EditorPayload, LinkTarget, LinkType, ResolvedLink};
use crate::node::{LinkData, data_id, data_label, data_str};
use crate::routes::{ROUTE_PAGE, ROUTE_RESOURCE_ID};

/// Free-form URL: `{"url": "https://...", "label": "..."}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UrlLink;

impl LinkType for UrlLink {
    fn name(&self) -> &str {
        "Custom URL"
    }

    fn validate(&self, data: &LinkData) -> Result<(), FieldError> {
        match data_str(data, "url") {
            Some(url) if !url.trim().is_empty() => Ok(()),
            _ => Err(FieldError::new("url", "URL link requires a URL")),
        }
    }

    fn label(&self, data: &LinkData, _cx: &LinkContext<'_>) -> Option<String> {
        data_label(data).map(str::to_owned)
    }

    fn target(&self, data: &LinkData, _cx: &LinkContext<'_>) -> ResolvedLink {
        let url = data_str(data, "url").unwrap_or_default().trim();
        ResolvedLink::new(LinkTarget::Uri(url.to_owned()))
    }
}

/// Static site page: `{"id": 3, "label": "..."}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PageLink;

impl LinkType for PageLink {
    fn name(&self) -> &str {
        "Page"
    }

    fn validate(&self, data: &LinkData) -> Result<(), FieldError> {
        match data_id(data) {
            Some(id) if id > 0 => Ok(()),
            _ => Err(FieldError::new("id", "Page link requires a page ID")),
        }
    }

    fn label(&self, data: &LinkData, cx: &LinkContext<'_>) -> Option<String> {
        if let Some(label) = data_label(data) {
            return Some(label.to_owned());
        }
        let page = data_id(data).and_then(|id| cx.site().page(id));
        Some(page.map_or_else(|| "[Missing page]".to_owned(), |page| page.title.clone()))
    }

    fn target(&self, data: &LinkData, cx: &LinkContext<'_>) -> ResolvedLink {
        match data_id(data).and_then(|id| cx.site().page(id)) {
            Some(page) => ResolvedLink::new(
                LinkTarget::route(ROUTE_PAGE).param("page-slug", page.slug.as_str()),
            ),
            None => ResolvedLink::new(LinkTarget::none()).hidden(),
        }
    }

    fn editor_payload(&self, data: &LinkData, cx: &LinkContext<'_>) -> EditorPayload {
        let is_public = data_id(data)
            .and_then(|id| cx.site().page(id))
            .is_none_or(|page| page.is_public);
        EditorPayload {
            is_public,
            ..EditorPayload::default()
        }
    }
}

/// Item, item set or media: `{"id": 12, "label": "..."}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceLink;

impl LinkType for ResourceLink {
    fn name(&self) -> &str {
        "Resource"
    }

    fn validate(&self, data: &LinkData) -> Result<(), FieldError> {
        match data_id(data) {
            Some(id) if id > 0 => Ok(()),
            _ => Err(FieldError::new(
                "id",
                "Resource link requires a resource ID",
            )),
        }
    }

    fn label(&self, data: &LinkData, cx: &LinkContext<'_>) -> Option<String> {
        if let Some(label) = data_label(data) {
            return Some(label.to_owned());
        }
        let id = data_id(data).unwrap_or(0);
        if id == 0 {
            return Some("[Unknown resource]".to_owned());
        }
        Some(cx.resource(id).map_or_else(
            || format!("[Unknown resource #{id}]"),
            |resource| resource.display_title().to_owned(),
        ))
    }

    fn target(&self, data: &LinkData, cx: &LinkContext<'_>) -> ResolvedLink {
        let id = data_id(data).unwrap_or(0);
        let Some(resource) = cx.resource(id) else {
            return ResolvedLink::new(LinkTarget::none())
                .with_class("resource")
                .hidden();
        };

        let controller = resource.kind.controller();
        ResolvedLink::new(
            LinkTarget::route(ROUTE_RESOURCE_ID)
                .param("controller", controller)
                .param("action", "show")
                .param("id", id.to_string()),
        )
        .with_class(format!("resource {controller}"))
    }

    fn editor_payload(&self, data: &LinkData, cx: &LinkContext<'_>) -> EditorPayload {
        let resource = data_id(data).and_then(|id| cx.resource(id));
        let mut details = LinkData::new();
        if let Some(resource) = &resource {
            details.insert(
                "resource_type".to_owned(),
                Value::from(resource.kind.controller()),
            );
            details.insert("title".to_owned(), Value::from(resource.display_title()));
        }
        EditorPayload {
            is_public: resource.is_none_or(|resource| resource.is_public),
            details,
        }
    }
}

/// Non-clickable grouping node: `{"label": "...", "class": "...", "is_public": true}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructureLink;

impl LinkType for StructureLink {
    fn name(&self) -> &str {
        "Structure"
    }

    fn validate(&self, _data: &LinkData) -> Result<(), FieldError> {
        Ok(())
    }

    fn label(&self, data: &LinkData, _cx: &LinkContext<'_>) -> Option<String> {
        // A single space keeps the node from falling back to the type name.
        Some(
            data_str(data, "label")
                .filter(|label| !label.is_empty())
                .unwrap_or(" ")
                .to_owned(),
        )
    }

    fn target(&self, data: &LinkData, _cx: &LinkContext<'_>) -> ResolvedLink {
        let link = ResolvedLink::new(LinkTarget::none());
        match data_str(data, "class").filter(|class| !class.trim().is_empty()) {
            Some(class) => link.with_class(class),
            None => link,
        }
    }

    fn editor_payload(&self, data: &LinkData, _cx: &LinkContext<'_>) -> EditorPayload {
        let is_public = match data.get("is_public") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_u64() != Some(0),
            Some(Value::String(s)) => !matches!(s.as_str(), "" | "0" | "false"),
            _ => true,
        };
        EditorPayload {
            is_public,
            ..EditorPayload::default()
        }
    }
}
