//! `[sandbox]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [sandbox]
//! fetch = true            # Allow `$fetch.<url>` bindings in data scripts (default: off)
//! fetch_timeout = 10      # Seconds
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub fetch: bool,
    pub fetch_timeout: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            fetch: false,
            fetch_timeout: 10,
        }
    }
}
