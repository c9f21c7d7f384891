//! HTTP responses.

use std::io::Read;

use anyhow::Result;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::compiler::EndpointResponse;
use crate::render::{ErrorFormat, render_error};
use crate::route::HandlerError;

pub const HTML: &str = "text/html; charset=utf-8";
pub const PLAIN: &str = "text/plain; charset=utf-8";

/// A complete response, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: HTML,
            body,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: PLAIN,
            body: body.into(),
        }
    }

    /// Health check answer.
    pub fn empty() -> Self {
        Self::text(200, "")
    }

    /// Error document negotiated from the request's `Accept` header.
    pub fn error(err: &HandlerError, accept: Option<&str>, show_stack: bool) -> Self {
        let format = ErrorFormat::negotiate(accept);
        Self {
            status: err.status,
            content_type: format.content_type(),
            body: render_error(err, format, show_stack),
        }
    }
}

impl From<EndpointResponse> for Reply {
    fn from(response: EndpointResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            body: response.body,
        }
    }
}

/// Send a reply. HEAD requests get the headers only.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    if request.method() == &Method::Head {
        let response = with_content_type(Response::empty(StatusCode(reply.status)), reply.content_type);
        request.respond(response)?;
        return Ok(());
    }

    let response = Response::from_string(reply.body).with_status_code(StatusCode(reply.status));
    request.respond(with_content_type(response, reply.content_type))?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, Reply::text(503, "503 Service Unavailable"))
}

fn with_content_type<R: Read>(response: Response<R>, content_type: &str) -> Response<R> {
    match Header::from_bytes("Content-Type", content_type) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

/// Header value by case-insensitive name.
pub fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reply_negotiates() {
        let err = HandlerError::new(404, "Page not found.");

        let html = Reply::error(&err, Some("text/html"), false);
        assert_eq!(html.status, 404);
        assert_eq!(html.content_type, HTML);
        assert!(html.body.contains("Page not found."));

        let json = Reply::error(&err, Some("application/json"), false);
        assert_eq!(json.content_type, "application/json");
        let value: serde_json::Value = serde_json::from_str(&json.body).unwrap();
        assert_eq!(value["status"], 404);
        assert_eq!(value["stack"], serde_json::Value::Null);
    }

    #[test]
    fn test_endpoint_reply() {
        let reply = Reply::from(EndpointResponse {
            status: 201,
            content_type: "application/json",
            body: "{}".into(),
        });
        assert_eq!(reply.status, 201);
        assert_eq!(reply.body, "{}");
    }
}
