//! HTML documents sent to browsers.
//!
//! - [`DocumentRenderer`] wraps a rendered page in a full document
//! - [`error`] builds error documents and their JSON form

pub mod error;

use serde_json::Value;

use crate::core::RouteId;
use crate::embed::serve::{DEV_SOCKET_JS, DevSocketVars, PAGE_HTML, PageVars};
use crate::utils::html::{escape, escape_script_json};

pub use error::{ErrorFormat, render_error};

/// Everything needed to assemble one page document.
#[derive(Debug, Clone, Copy)]
pub struct PageParts<'a> {
    pub route: &'a RouteId,
    /// Client component class the hydration script defines.
    pub class_name: &'a str,
    pub markup: &'a str,
    pub style: &'a str,
    pub hydration_script: &'a str,
    pub data: &'a Value,
    /// `None` in production.
    pub dev: Option<DevEndpoints<'a>>,
}

/// Development endpoints the browser client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevEndpoints<'a> {
    pub socket_path: &'a str,
    pub ping_path: &'a str,
}

/// Turns page parts into an HTML document.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, parts: &PageParts<'_>) -> String;
}

/// Built-in document: server markup hydrated in place by the page's class.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageDocument;

impl DocumentRenderer for PageDocument {
    fn render(&self, parts: &PageParts<'_>) -> String {
        let data_json = script_literal(parts.data);

        let dev_script = parts
            .dev
            .map(|dev| {
                let js = DEV_SOCKET_JS.render(&DevSocketVars {
                    socket_path: &script_literal(&Value::from(dev.socket_path)),
                    ping_path: &script_literal(&Value::from(dev.ping_path)),
                    route: &script_literal(&Value::from(parts.route.as_str())),
                });
                format!("<script>\n{js}</script>")
            })
            .unwrap_or_default();

        PAGE_HTML.render(&PageVars {
            title: &escape(parts.route.as_str()),
            style: parts.style,
            markup: parts.markup,
            hydration_script: parts.hydration_script,
            class_name: parts.class_name,
            data_json: &data_json,
            dev_script: &dev_script,
        })
    }
}

/// JSON literal safe to place inside `<script>`.
fn script_literal(value: &Value) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "null".into());
    escape_script_json(&json).into_owned()
}
