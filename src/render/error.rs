//! Error documents.
//!
//! The same [`HandlerError`] renders as HTML for browsers or as
//! `{"status","message","stack"}` for clients that ask for JSON. Stack
//! detail is only included when the caller allows it.

use serde_json::json;

use crate::embed::serve::{ERROR_HTML, ErrorVars};
use crate::route::HandlerError;
use crate::utils::html::escape;

/// Representation negotiated from the request's `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    Html,
    Json,
}

impl ErrorFormat {
    /// JSON only when the client ranks it above HTML.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return Self::Html;
        };

        let mut json_q = 0.0_f32;
        let mut html_q = 0.0_f32;
        for range in accept.split(',') {
            let mut parts = range.split(';').map(str::trim);
            let media = parts.next().unwrap_or_default().to_ascii_lowercase();
            let q = parts
                .find_map(|p| p.strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);

            match media.as_str() {
                "application/json" => json_q = json_q.max(q),
                "text/html" => html_q = html_q.max(q),
                _ => {}
            }
        }

        if json_q > html_q { Self::Json } else { Self::Html }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

/// Render an error body in the given format.
pub fn render_error(err: &HandlerError, format: ErrorFormat, show_stack: bool) -> String {
    let stack = err.stack.as_deref().filter(|_| show_stack);

    match format {
        ErrorFormat::Json => json!({
            "status": err.status,
            "message": err.message,
            "stack": stack,
        })
        .to_string(),
        ErrorFormat::Html => {
            let stack = stack
                .map(|s| format!("<pre><code>{}</code></pre>", escape(s)))
                .unwrap_or_default();
            ERROR_HTML.render(&ErrorVars {
                status: &err.status.to_string(),
                message: &escape(&err.message),
                stack: &stack,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteError;

    #[test]
    fn test_negotiate() {
        assert_eq!(ErrorFormat::negotiate(None), ErrorFormat::Html);
        assert_eq!(ErrorFormat::negotiate(Some("application/json")), ErrorFormat::Json);
        assert_eq!(
            ErrorFormat::negotiate(Some("text/html,application/json;q=0.9")),
            ErrorFormat::Html
        );
        assert_eq!(
            ErrorFormat::negotiate(Some("text/html;q=0.5, application/json")),
            ErrorFormat::Json
        );
        assert_eq!(ErrorFormat::negotiate(Some("*/*")), ErrorFormat::Html);
    }

    #[test]
    fn test_not_found_document() {
        let err = HandlerError::from(RouteError::NotFound);
        let html = render_error(&err, ErrorFormat::Html, true);
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("<h2>Page not found.</h2>"));
        assert!(!html.contains("<pre>"));
    }

    #[test]
    fn test_stack_only_when_allowed() {
        let err = HandlerError::internal("broke <here>").with_stack("at a.page:1:1");

        let shown = render_error(&err, ErrorFormat::Html, true);
        assert!(shown.contains("<pre><code>at a.page:1:1</code></pre>"));
        assert!(shown.contains("broke &lt;here&gt;"));

        let hidden = render_error(&err, ErrorFormat::Html, false);
        assert!(!hidden.contains("a.page"));
    }

    #[test]
    fn test_json_body() {
        let err = HandlerError::internal("boom").with_stack("trace");
        let body: serde_json::Value =
            serde_json::from_str(&render_error(&err, ErrorFormat::Json, false)).unwrap();
        assert_eq!(body, json!({"status": 500, "message": "boom", "stack": null}));
    }
}
