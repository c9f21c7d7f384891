//! Sync channel wire format.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compiler::DependencySnapshot;
use crate::core::RouteId;

/// Message from the compile worker, tagged by `type`.
///
/// ```json
/// {"type":"dependency_map","dependency_map":{"/src/Nav.component":["/src/index.page"]}}
/// {"type":"route","route":"/","contents":{...}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncMessage {
    /// Whole dependency graph, replacing the previous one.
    DependencyMap { dependency_map: DependencySnapshot },

    /// Fresh artifact for one route.
    Route { route: RouteId, contents: RouteContents },
}

/// Compiled artifact for a route, as it travels over the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteContents {
    pub source_relative_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_script: Option<String>,
    pub hydration_script: String,
    pub module_code: String,
    pub style: String,
    /// Absolute paths of the route source's direct imports.
    #[serde(default)]
    pub dependencies: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed sync frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("route `{route}` depends on `{}`, which the dependency graph does not know", dep.display())]
    StaleGraph { route: RouteId, dep: PathBuf },

    #[error("sync channel disconnected")]
    Disconnected,
}

/// One encoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFrame(String);

impl SyncFrame {
    pub fn encode(message: &SyncMessage) -> Result<Self, SyncError> {
        Ok(Self(serde_json::to_string(message)?))
    }

    /// Wrap raw text received from elsewhere.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn decode(&self) -> Result<SyncMessage, SyncError> {
        Ok(serde_json::from_str(&self.0)?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
