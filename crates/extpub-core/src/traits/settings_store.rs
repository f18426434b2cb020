// # Settings Store Trait
//
// Optional key/value lookup, keyed by request context.
//
// ## Purpose
//
// Used only as a last-resort credential source: a provider that finds no
// explicit config value and no environment variable may ask the settings
// store before giving up. A miss is `Ok(None)`, never an error.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::context::RequestContext;

/// Trait for settings store implementations
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Look up a setting value
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: The stored value
    /// - `Ok(None)`: No value for this key
    /// - `Err(Error)`: Storage error
    async fn get(&self, ctx: &RequestContext, key: &str) -> Result<Option<String>, crate::Error>;
}

/// In-memory settings store
///
/// Useful for tests and embedded deployments.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySettingsStore {
    /// Create an empty settings store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value
    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.write().await.insert(key.into(), value.into());
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, _ctx: &RequestContext, key: &str) -> Result<Option<String>, crate::Error> {
        Ok(self.inner.read().await.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_settings_lookup() {
        let store = MemorySettingsStore::new();
        let ctx = RequestContext::new("test");

        assert_eq!(store.get(&ctx, "devto_api_key").await.unwrap(), None);

        store.set("devto_api_key", "k-123").await;
        assert_eq!(
            store.get(&ctx, "devto_api_key").await.unwrap(),
            Some("k-123".to_string())
        );
    }
}
