//! Compiled route cache.
//!
//! Holds the current artifact of every compiled page and, in development,
//! the one it replaced so the hot-reload diff can compare the two. Only
//! sync frames write here, with two exceptions: a style patch rewrites the
//! current style, and the data handler is linked on first use.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use super::RouteContents;
use crate::core::{RouteId, RunMode};
use crate::sandbox::{DataHandler, LinkError, Sandbox};

/// Cached artifact of one compiled page.
pub struct RouteArtifact {
    pub source_relative_path: String,
    pub data_script: Option<String>,
    pub hydration_script: String,
    pub module_code: String,
    pub style: String,
    pub dependencies: Vec<PathBuf>,
    /// Linked data script, filled on first request.
    data_handler: Mutex<Option<Arc<dyn DataHandler>>>,
}

impl RouteArtifact {
    pub fn from_contents(contents: RouteContents) -> Self {
        Self {
            source_relative_path: contents.source_relative_path,
            data_script: contents.data_script,
            hydration_script: contents.hydration_script,
            module_code: contents.module_code,
            style: contents.style,
            dependencies: contents.dependencies,
            data_handler: Mutex::new(None),
        }
    }

    /// Same artifact with a different style; the linked handler carries over.
    fn with_style(&self, style: String) -> Self {
        Self {
            source_relative_path: self.source_relative_path.clone(),
            data_script: self.data_script.clone(),
            hydration_script: self.hydration_script.clone(),
            module_code: self.module_code.clone(),
            style,
            dependencies: self.dependencies.clone(),
            data_handler: Mutex::new(self.data_handler.lock().clone()),
        }
    }

    /// Linked data handler, linking on first use. `None` without a data script.
    pub fn data_handler(
        &self,
        sandbox: &Sandbox,
    ) -> Result<Option<Arc<dyn DataHandler>>, LinkError> {
        let Some(script) = &self.data_script else {
            return Ok(None);
        };

        let mut slot = self.data_handler.lock();
        if let Some(handler) = slot.as_ref() {
            return Ok(Some(Arc::clone(handler)));
        }

        let handler = sandbox.link(script)?;
        *slot = Some(Arc::clone(&handler));
        Ok(Some(handler))
    }
}

impl fmt::Debug for RouteArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteArtifact")
            .field("source_relative_path", &self.source_relative_path)
            .field("has_data_script", &self.data_script.is_some())
            .field("style_len", &self.style.len())
            .finish_non_exhaustive()
    }
}

/// Current and previous artifact of one route.
#[derive(Debug, Clone)]
pub struct RouteVersions {
    pub previous: Option<Arc<RouteArtifact>>,
    pub current: Arc<RouteArtifact>,
}

#[derive(Debug)]
pub struct RouteCache {
    mode: RunMode,
    routes: RwLock<FxHashMap<RouteId, RouteVersions>>,
}

impl RouteCache {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            routes: RwLock::new(FxHashMap::default()),
        }
    }

    /// Install a fresh artifact. In development the old current becomes previous.
    pub fn upsert(&self, route: RouteId, contents: RouteContents) {
        let current = Arc::new(RouteArtifact::from_contents(contents));
        let mut routes = self.routes.write();

        let previous = match routes.remove(&route) {
            Some(old) if self.mode.is_development() => Some(old.current),
            _ => None,
        };
        routes.insert(route, RouteVersions { previous, current });
    }

    pub fn current(&self, route: &RouteId) -> Option<Arc<RouteArtifact>> {
        self.routes.read().get(route).map(|v| Arc::clone(&v.current))
    }

    pub fn versions(&self, route: &RouteId) -> Option<RouteVersions> {
        self.routes.read().get(route).cloned()
    }

    /// Overwrite the current style. Returns false when the route is unknown.
    pub fn replace_style(&self, route: &RouteId, style: String) -> bool {
        let mut routes = self.routes.write();
        let Some(versions) = routes.get_mut(route) else {
            return false;
        };
        versions.current = Arc::new(versions.current.with_style(style));
        true
    }

    pub fn len(&self) -> usize {
        self.routes.read().len()
    }
}
