//! HTTP request handlers.

pub(crate) mod menus;
pub(crate) mod render;
