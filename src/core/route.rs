//! Route identifier type.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Normalized route identifier (`/`, `/users/:id`).
///
/// Invariants:
/// - Always starts with `/`
/// - No trailing `/` except for the root
/// - No empty segments
/// - Parameters are written `:name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(Arc<str>);

impl RouteId {
    /// Build from path segments, dropping empty ones.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let joined = segments
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(Arc::from(format!("/{joined}")))
    }

    /// Normalize an arbitrary route string.
    pub fn new(raw: &str) -> Self {
        Self::from_segments(raw.split('/'))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pattern syntax understood by the URL matcher (`/users/{id}`).
    ///
    /// Literal braces are doubled so they match verbatim.
    pub fn to_pattern(&self) -> String {
        self.0
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => format!("{{{name}}}"),
                None => segment.replace('{', "{{").replace('}', "}}"),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Client-side component class name (`/users/:id` -> `UsersIdPage`).
    pub fn class_name(&self) -> String {
        let mut name = String::new();
        for word in self.0.split(|c: char| !c.is_ascii_alphanumeric()) {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                name.push(first.to_ascii_uppercase());
                name.extend(chars);
            }
        }
        if name.is_empty() {
            name.push_str("Index");
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        name.push_str("Page");
        name
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RouteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RouteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(RouteId::new("").as_str(), "/");
        assert_eq!(RouteId::new("/").as_str(), "/");
        assert_eq!(RouteId::new("blog/").as_str(), "/blog");
        assert_eq!(RouteId::new("//a//b/").as_str(), "/a/b");
    }

    #[test]
    fn test_params() {
        let route = RouteId::new("/users/:id/posts/:post");
        assert_eq!(route.to_pattern(), "/users/{id}/posts/{post}");
    }

    #[test]
    fn test_pattern_escapes_braces() {
        assert_eq!(RouteId::new("/a{b}").to_pattern(), "/a{{b}}");
    }

    #[test]
    fn test_class_name() {
        assert_eq!(RouteId::new("/").class_name(), "IndexPage");
        assert_eq!(RouteId::new("/users/:id").class_name(), "UsersIdPage");
        assert_eq!(RouteId::new("/blog-posts").class_name(), "BlogPostsPage");
        assert_eq!(RouteId::new("/404").class_name(), "_404Page");
    }

    #[test]
    fn test_serde_as_string() {
        let route = RouteId::new("/chat");
        let json = serde_json::to_string(&route).unwrap();
        assert_eq!(json, "\"/chat\"");
        let back: RouteId = serde_json::from_str("\"chat/\"").unwrap();
        assert_eq!(back, route);
    }
}
