//! Hot reload message protocol.
//!
//! JSON frames pushed to development clients over the dev socket:
//!
//! - `{"type":"reload"}`: reload the page
//! - `{"type":"css","code":"..."}`: replace the page style in place

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    Reload,
    Css { code: String },
}

impl HotReloadMessage {
    pub fn css(code: impl Into<String>) -> Self {
        Self::Css { code: code.into() }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::Css { .. } => "css",
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(HotReloadMessage::Reload.to_json(), r#"{"type":"reload"}"#);
        assert_eq!(
            HotReloadMessage::css("h1{}").to_json(),
            r#"{"type":"css","code":"h1{}"}"#
        );
    }

    #[test]
    fn test_parse() {
        let msg: HotReloadMessage = serde_json::from_str(r#"{"type":"css","code":"x"}"#).unwrap();
        assert_eq!(msg, HotReloadMessage::css("x"));
        assert!(serde_json::from_str::<HotReloadMessage>(r#"{"type":"patch"}"#).is_err());
    }
}
