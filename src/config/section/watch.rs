//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! ignore = ["node_modules", "#static", "vendor"]
//! ```
//!
//! Dot-prefixed files and directories are always ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory or file names skipped anywhere in the source tree.
    pub ignore: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            ignore: vec!["node_modules".into(), "#static".into()],
        }
    }
}
