//! `[project]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [project]
//! source = "app"          # Source directory (default: `src` if present, else the root)
//! production = false      # Exit on change instead of hot reloading
//! store = "store.json"    # Seed file for the data store, relative to `<source>/.db`
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Source directory, relative to the project root.
    pub source: Option<PathBuf>,

    /// Production mode. Also enabled by `--production` or `KETTLE_PRODUCTION`.
    pub production: bool,

    /// Seed file for the in-memory data store.
    pub store: Option<PathBuf>,
}
