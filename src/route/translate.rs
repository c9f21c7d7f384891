//! File path to route translation.
//!
//! ```text
//! <base>/users_[id].get      →  strip base     →  users_[id].get
//!                            →  strip ext      →  users_[id]
//!                            →  `_` to `/`     →  users/[id]
//!                            →  `[x]` to `:x`  →  users/:id
//!                            →  drop `index`   →  /users/:id   (get)
//! ```
//!
//! Pure: the same `(base, path)` always translates to the same route.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::{FileKind, RouteId, RouteMethod};

/// `[name]` route parameter marker in file names.
static PARAM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());

/// Result of translating a routable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub route: RouteId,
    pub method: RouteMethod,
    pub kind: FileKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("`{0}` is not under the source directory")]
    OutsideBase(PathBuf),

    #[error("`{0}` has no recognised extension")]
    Unrecognised(PathBuf),

    #[error("`{path}` is a {kind:?} and cannot be routed")]
    NotRoutable { path: PathBuf, kind: FileKind },
}

/// Translate a source file path into its route and method.
pub fn translate(base: &Path, path: &Path) -> Result<RouteSpec, TranslateError> {
    let kind = FileKind::from_path(path)
        .ok_or_else(|| TranslateError::Unrecognised(path.to_path_buf()))?;
    let method = kind
        .route_method()
        .ok_or_else(|| TranslateError::NotRoutable {
            path: path.to_path_buf(),
            kind,
        })?;

    let relative = path
        .strip_prefix(base)
        .map_err(|_| TranslateError::OutsideBase(path.to_path_buf()))?;

    let mut raw = relative.to_string_lossy().replace('\\', "/");
    // Extension is ASCII, so the byte arithmetic stays on a char boundary.
    raw.truncate(raw.len() - kind.extension().len() - 1);

    let raw = raw.replace('_', "/");
    let raw = PARAM_MARKER.replace_all(&raw, ":$1");

    let route = RouteId::from_segments(raw.split('/').filter(|segment| *segment != "index"));

    Ok(RouteSpec {
        route,
        method,
        kind,
    })
}
