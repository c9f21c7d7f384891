//! Key-value store shared by data scripts.

use std::path::Path;

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde_json::Value;

/// Persistent store handle. Single-key reads and writes, no transactions.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
}

/// In-process store, optionally seeded from a JSON object file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load top-level keys of a JSON object file.
    pub fn seeded(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read store seed {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("store seed {} is not valid JSON", path.display()))?;
        let Value::Object(map) = value else {
            anyhow::bail!("store seed {} must be a JSON object", path.display());
        };

        let store = Self::new();
        for (key, value) in map {
            store.set(&key, value);
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}
