//! HTTP verbs recognised as file extensions, and the route method axis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP verb of a handler file (`users.post` answers `POST /users`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Head,
    Patch,
    Options,
    Connect,
    Delete,
    Trace,
    Post,
    Put,
}

impl HttpMethod {
    /// Every verb, in the order extensions are documented.
    pub const ALL: [Self; 9] = [
        Self::Get,
        Self::Head,
        Self::Patch,
        Self::Options,
        Self::Connect,
        Self::Delete,
        Self::Trace,
        Self::Post,
        Self::Put,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Options => "options",
            Self::Connect => "connect",
            Self::Delete => "delete",
            Self::Trace => "trace",
            Self::Post => "post",
            Self::Put => "put",
        }
    }

    /// Parse a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == ext)
    }

    /// Map a transport method. Returns `None` for verbs with no file extension.
    pub fn from_transport(method: &tiny_http::Method) -> Option<Self> {
        use tiny_http::Method as M;
        Some(match method {
            M::Get => Self::Get,
            M::Head => Self::Head,
            M::Patch => Self::Patch,
            M::Options => Self::Options,
            M::Connect => Self::Connect,
            M::Delete => Self::Delete,
            M::Trace => Self::Trace,
            M::Post => Self::Post,
            M::Put => Self::Put,
            M::NonStandard(_) => return None,
        })
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a route is reached: a plain HTTP verb or a WebSocket upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteMethod {
    Http(HttpMethod),
    Socket,
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(m) => m.fmt(f),
            Self::Socket => f.write_str("socket"),
        }
    }
}
