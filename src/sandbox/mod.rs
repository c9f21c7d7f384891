//! Data-script sandbox.
//!
//! A page's `<data>` script runs on every request to produce the data the
//! page renders against. Scripts are linked once per compiled artifact by a
//! [`DataRuntime`] and evaluated with access only to what the [`Sandbox`]
//! exposes:
//!
//! | Global    | Source                                   |
//! |-----------|------------------------------------------|
//! | store     | [`Store`] shared by the whole server     |
//! | console   | the `data` log prefix                    |
//! | process   | pid, run mode, engine version            |
//! | fetch     | outbound GET, off unless configured      |
//! | request   | the [`RequestInfo`] being served         |

mod error;
mod fetch;
mod json;
mod store;

use std::sync::Arc;

use serde_json::Value;

use crate::config::SandboxConfig;
use crate::core::{RequestInfo, RunMode};
use crate::log;

pub use error::LinkError;
pub use fetch::FetchPolicy;
pub use json::JsonRuntime;
pub use store::{MemoryStore, Store};

/// Links data scripts into callable handlers.
pub trait DataRuntime: Send + Sync {
    fn link(&self, source: &str) -> Result<Arc<dyn DataHandler>, LinkError>;
}

/// A linked data script.
pub trait DataHandler: Send + Sync {
    fn call(&self, request: &RequestInfo, sandbox: &Sandbox) -> Result<Value, LinkError>;
}

/// Metadata exposed as `process`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub mode: RunMode,
    pub version: &'static str,
}

impl ProcessInfo {
    pub fn current(mode: RunMode) -> Self {
        Self {
            pid: std::process::id(),
            mode,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Globals injected into every data script, built once per server.
pub struct Sandbox {
    runtime: Arc<dyn DataRuntime>,
    store: Arc<dyn Store>,
    process: ProcessInfo,
    fetch: FetchPolicy,
}

impl Sandbox {
    pub fn new(
        runtime: Arc<dyn DataRuntime>,
        store: Arc<dyn Store>,
        mode: RunMode,
        config: &SandboxConfig,
    ) -> Self {
        Self {
            runtime,
            store,
            process: ProcessInfo::current(mode),
            fetch: FetchPolicy::from_config(config),
        }
    }

    pub fn link(&self, source: &str) -> Result<Arc<dyn DataHandler>, LinkError> {
        self.runtime.link(source)
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn process(&self) -> &ProcessInfo {
        &self.process
    }

    /// `console` output of a data script.
    pub fn console(&self, message: &str) {
        log!("data"; "{}", message);
    }

    /// Outbound fetch under the configured policy. `null` when refused or failed.
    pub fn fetch(&self, url: &str) -> Value {
        self.fetch.fetch(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_info() {
        let info = ProcessInfo::current(RunMode::Production);
        assert_eq!(info.pid, std::process::id());
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.mode, RunMode::Production);
    }

    #[test]
    fn test_sandbox_delegates_store() {
        let store = Arc::new(MemoryStore::new());
        store.set("k", Value::from(1));
        let sandbox = Sandbox::new(
            Arc::new(JsonRuntime),
            store,
            RunMode::Development,
            &SandboxConfig::default(),
        );
        assert_eq!(sandbox.store().get("k"), Some(Value::from(1)));
        assert_eq!(sandbox.fetch("https://example.com"), Value::Null);
    }
}
