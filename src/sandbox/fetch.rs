//! Outbound fetch available to data scripts.

use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::config::SandboxConfig;
use crate::log;

/// Whether and how data scripts may reach the network.
pub enum FetchPolicy {
    /// Every fetch resolves to `null` with a warning.
    Disabled,
    Enabled {
        timeout: Duration,
        /// Built on first use; `None` if the TLS backend failed to initialise.
        client: OnceLock<Option<reqwest::blocking::Client>>,
    },
}

impl FetchPolicy {
    pub fn from_config(config: &SandboxConfig) -> Self {
        if config.fetch {
            Self::Enabled {
                timeout: Duration::from_secs(config.fetch_timeout),
                client: OnceLock::new(),
            }
        } else {
            Self::Disabled
        }
    }

    /// GET `url`. JSON bodies are parsed, anything else is returned as a string.
    pub fn fetch(&self, url: &str) -> Value {
        let Self::Enabled { timeout, client } = self else {
            log!("data"; "fetch of {} refused: enable [sandbox] fetch", url);
            return Value::Null;
        };

        let url = match check_url(url) {
            Ok(url) => url,
            Err(reason) => {
                log!("data"; "fetch of {} refused: {}", url, reason);
                return Value::Null;
            }
        };

        let Some(client) = client.get_or_init(|| build_client(*timeout)) else {
            return Value::Null;
        };

        match client.get(url.clone()).send().and_then(|r| r.error_for_status()) {
            Ok(response) => match response.text() {
                Ok(body) => serde_json::from_str(&body).unwrap_or(Value::String(body)),
                Err(err) => {
                    log!("data"; "fetch of {} failed: {}", url, err);
                    Value::Null
                }
            },
            Err(err) => {
                log!("data"; "fetch of {} failed: {}", url, err);
                Value::Null
            }
        }
    }
}

fn build_client(timeout: Duration) -> Option<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("kettle/", env!("CARGO_PKG_VERSION")))
        .build()
        .inspect_err(|err| log!("data"; "fetch unavailable: {}", err))
        .ok()
}

/// Only absolute http(s) URLs are fetched.
fn check_url(raw: &str) -> Result<Url, &'static str> {
    let url = Url::parse(raw).map_err(|_| "not an absolute URL")?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err("only http and https are allowed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        let policy = FetchPolicy::from_config(&SandboxConfig::default());
        assert!(matches!(policy, FetchPolicy::Disabled));
        assert_eq!(policy.fetch("https://example.com"), Value::Null);
    }

    #[test]
    fn test_check_url() {
        assert!(check_url("https://example.com/a.json").is_ok());
        assert!(check_url("file:///etc/passwd").is_err());
        assert!(check_url("/relative").is_err());
    }

    #[test]
    fn test_bad_scheme_refused_before_network() {
        let policy = FetchPolicy::from_config(&SandboxConfig {
            fetch: true,
            fetch_timeout: 1,
        });
        assert_eq!(policy.fetch("ftp://example.com/x"), Value::Null);
        let FetchPolicy::Enabled { client, .. } = &policy else {
            panic!("expected enabled policy");
        };
        assert!(client.get().is_none());
    }
}
