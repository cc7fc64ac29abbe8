//! Typed access to the persisted [`DomainSpeedMap`].

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::{ContextId, DOMAIN_SPEEDS_KEY, DomainKey, DomainSpeedMap, SpeedValue};
use crate::ports::{KeyValueStore, StoreChange, StoreError};

/// Read-merge-write wrapper around the shared store.
#[derive(Clone)]
pub struct SpeedPreferences {
    store: Arc<dyn KeyValueStore>,
}

impl SpeedPreferences {
    /// Wrap a store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the whole map. A missing record is an empty map.
    pub async fn load_map(&self) -> Result<DomainSpeedMap, StoreError> {
        let value = self.store.get(DOMAIN_SPEEDS_KEY).await?;
        Ok(value
            .as_ref()
            .map(DomainSpeedMap::from_json)
            .unwrap_or_default())
    }

    /// Stored speed for `domain`, if any.
    pub async fn speed_for(&self, domain: &DomainKey) -> Result<Option<SpeedValue>, StoreError> {
        Ok(self.load_map().await?.get(domain))
    }

    /// Merge `speed` for `domain` into the stored map and write it back.
    ///
    /// Last writer wins: a concurrent write from another context between
    /// the read and the write is overwritten.
    pub async fn save_speed(
        &self,
        domain: &DomainKey,
        speed: SpeedValue,
        origin: ContextId,
    ) -> Result<DomainSpeedMap, StoreError> {
        let mut map = self.load_map().await?;
        map.insert(domain, speed);
        self.store.set(DOMAIN_SPEEDS_KEY, map.to_json(), origin).await?;
        Ok(map)
    }

    /// Remove `domain` from the stored map. Returns whether it was present.
    pub async fn forget(&self, domain: &DomainKey, origin: ContextId) -> Result<bool, StoreError> {
        let mut map = self.load_map().await?;
        if !map.remove(domain) {
            return Ok(false);
        }
        self.store.set(DOMAIN_SPEEDS_KEY, map.to_json(), origin).await?;
        Ok(true)
    }

    /// Subscribe to the underlying change feed.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.store.subscribe()
    }

    /// Extract the raw speed reported for `domain` from a change.
    ///
    /// Returns `None` when the change is for another key; `Some(None)` when
    /// the domain is absent from the new map.
    pub fn decode_change(change: &StoreChange, domain: &DomainKey) -> Option<Option<f64>> {
        if change.key != DOMAIN_SPEEDS_KEY {
            return None;
        }
        Some(
            change
                .new_value
                .as_ref()
                .and_then(|value| DomainSpeedMap::from_json(value).raw(domain)),
        )
    }
}
