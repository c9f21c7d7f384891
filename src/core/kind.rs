//! Watched file-kind taxonomy.
//!
//! | Extension                 | Kind        | Routable |
//! |---------------------------|-------------|----------|
//! | `.page`                   | `Page`      | yes      |
//! | `.component` / `.layout`  | `Component` / `Layout` | no |
//! | `.socket`                 | `Socket`    | yes      |
//! | `.get`, `.post`, ...      | `Verb(_)`   | yes      |

use std::path::Path;

use super::method::{HttpMethod, RouteMethod};

/// Role of a source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Full page: markup, optional data script, participates in hot-reload diffing.
    Page,
    /// Reusable fragment compiled like a page, not directly routable.
    Component,
    Layout,
    /// WebSocket endpoint.
    Socket,
    /// Plain HTTP handler.
    Verb(HttpMethod),
}

impl FileKind {
    /// Classify by extension. `None` for files that are not watched.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "page" => Some(Self::Page),
            "component" => Some(Self::Component),
            "layout" => Some(Self::Layout),
            "socket" => Some(Self::Socket),
            other => HttpMethod::from_extension(other).map(Self::Verb),
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Component => "component",
            Self::Layout => "layout",
            Self::Socket => "socket",
            Self::Verb(m) => m.as_str(),
        }
    }

    #[inline]
    pub const fn is_page(self) -> bool {
        matches!(self, Self::Page)
    }

    /// Fragments are compiled but never get a Route Table Entry.
    #[inline]
    pub const fn is_routable(self) -> bool {
        !matches!(self, Self::Component | Self::Layout)
    }

    /// Files compiled through the view pipeline (markup, script, style).
    #[inline]
    pub const fn is_view(self) -> bool {
        matches!(self, Self::Page | Self::Component | Self::Layout)
    }

    /// Method a routable kind is served under.
    pub const fn route_method(self) -> Option<RouteMethod> {
        match self {
            Self::Page => Some(RouteMethod::Http(HttpMethod::Get)),
            Self::Verb(m) => Some(RouteMethod::Http(m)),
            Self::Socket => Some(RouteMethod::Socket),
            Self::Component | Self::Layout => None,
        }
    }
}

/// Whether the path names a page file.
#[inline]
pub fn is_page_file(path: &Path) -> bool {
    FileKind::from_path(path).is_some_and(FileKind::is_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(FileKind::from_path(Path::new("a/index.page")), Some(FileKind::Page));
        assert_eq!(
            FileKind::from_path(Path::new("a/Nav.component")),
            Some(FileKind::Component)
        );
        assert_eq!(
            FileKind::from_path(Path::new("users_[id].get")),
            Some(FileKind::Verb(HttpMethod::Get))
        );
        assert_eq!(FileKind::from_path(Path::new("chat.socket")), Some(FileKind::Socket));
        assert_eq!(FileKind::from_path(Path::new("README.md")), None);
        assert_eq!(FileKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_routability() {
        assert!(FileKind::Page.is_routable());
        assert!(FileKind::Socket.is_routable());
        assert!(!FileKind::Component.is_routable());
        assert!(!FileKind::Layout.is_routable());
        assert_eq!(FileKind::Layout.route_method(), None);
        assert_eq!(
            FileKind::Page.route_method(),
            Some(RouteMethod::Http(HttpMethod::Get))
        );
    }

    #[test]
    fn test_is_page_file() {
        assert!(is_page_file(Path::new("/x/about.page")));
        assert!(!is_page_file(Path::new("/x/Card.component")));
    }
}
