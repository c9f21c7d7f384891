//! `[dev]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [dev]
//! show_stack = true                   # Include error detail in error documents
//! socket_path = "/.well-known/dev"    # Hot reload socket
//! ping_path = "/.well-known/ping"     # Health check
//! ```
//!
//! Stack detail is never shown in production, whatever `show_stack` says.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    pub show_stack: bool,
    pub socket_path: String,
    pub ping_path: String,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            show_stack: true,
            socket_path: "/.well-known/dev".into(),
            ping_path: "/.well-known/ping".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_dev_defaults() {
        let config = test_parse_config("");
        assert!(config.dev.show_stack);
        assert_eq!(config.dev.socket_path, "/.well-known/dev");
        assert_eq!(config.dev.ping_path, "/.well-known/ping");
    }

    #[test]
    fn test_dev_override() {
        let config = test_parse_config("[dev]\nshow_stack = false\nping_path = \"/healthz\"");
        assert!(!config.dev.show_stack);
        assert_eq!(config.dev.ping_path, "/healthz");
        assert_eq!(config.dev.socket_path, "/.well-known/dev");
    }
}
