//! In-memory store shared by every context in the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use vidpace_core::{ContextId, KeyValueStore, StoreChange, StoreError};

use crate::CHANGE_FEED_CAPACITY;

#[derive(Debug)]
struct Shared {
    values: Mutex<HashMap<String, Value>>,
    changes: broadcast::Sender<StoreChange>,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

/// Process-wide store. Clones share the same data and change feed.
#[derive(Debug, Clone)]
pub struct MemorySpeedStore {
    shared: Arc<Shared>,
}

impl MemorySpeedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                values: Mutex::new(HashMap::new()),
                changes: broadcast::channel(CHANGE_FEED_CAPACITY).0,
                writes: AtomicUsize::new(0),
                unavailable: AtomicBool::new(false),
            }),
        }
    }

    /// Number of acknowledged `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.shared.writes.load(Ordering::SeqCst)
    }

    /// Simulate the backend going away (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.shared.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current value for `key`, bypassing the async interface.
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.shared
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.shared.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

impl Default for MemorySpeedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemorySpeedStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.check_available()?;
        Ok(self.snapshot(key))
    }

    async fn set(&self, key: &str, value: Value, origin: ContextId) -> Result<(), StoreError> {
        self.check_available()?;

        let old_value = self
            .shared
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.clone());
        self.shared.writes.fetch_add(1, Ordering::SeqCst);

        if old_value.as_ref() == Some(&value) {
            return Ok(());
        }

        let change = StoreChange {
            key: key.to_string(),
            old_value,
            new_value: Some(value),
            origin: Some(origin),
        };
        if self.shared.changes.send(change).is_err() {
            debug!(key, "No change subscribers");
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.shared.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_clones_share_data_and_feed() {
        let store = MemorySpeedStore::new();
        let other = store.clone();
        let mut feed = other.subscribe();
        let origin = ContextId::next();

        store.set("k", json!({ "a": 1 }), origin).await.unwrap();

        assert_eq!(other.get("k").await.unwrap(), Some(json!({ "a": 1 })));
        let change = feed.recv().await.unwrap();
        assert_eq!(change.key, "k");
        assert_eq!(change.old_value, None);
        assert_eq!(change.origin, Some(origin));
    }

    #[tokio::test]
    async fn test_identical_write_is_not_broadcast() {
        let store = MemorySpeedStore::new();
        let mut feed = store.subscribe();
        let origin = ContextId::next();

        store.set("k", json!(1), origin).await.unwrap();
        store.set("k", json!(1), origin).await.unwrap();
        store.set("k", json!(2), origin).await.unwrap();

        assert_eq!(feed.recv().await.unwrap().new_value, Some(json!(1)));
        let second = feed.recv().await.unwrap();
        assert_eq!(second.old_value, Some(json!(1)));
        assert_eq!(second.new_value, Some(json!(2)));
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MemorySpeedStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.set("k", json!(1), ContextId::next()).await.is_err());
        assert_eq!(store.write_count(), 0);
    }
}
