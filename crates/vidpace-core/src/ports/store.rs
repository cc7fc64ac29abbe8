//! Shared key-value store port.
//!
//! Models an asynchronous, eventually-consistent store shared by every
//! context (pages, popup, CLI) with a change feed. The feed may or may not
//! include the writer's own changes; consumers must not rely on either.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::ContextId;

/// Errors from store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the operation.
    #[error("Store rejected operation: {0}")]
    Rejected(String),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// One change notification from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    /// Key that changed.
    pub key: String,
    /// Value before the write (`None` if it did not exist).
    pub old_value: Option<Value>,
    /// Value after the write (`None` if it was removed).
    pub new_value: Option<Value>,
    /// Context that performed the write, when the backend knows it.
    pub origin: Option<ContextId>,
}

/// Shared key-value store with change notifications.
///
/// # Design Rules
///
/// - Values are arbitrary JSON; typed access lives in `SpeedPreferences`
/// - `set` resolves once the write is acknowledged
/// - Subscribers receive changes from every context, possibly including
///   their own writes
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write `value` under `key`, tagging the change with `origin`.
    async fn set(&self, key: &str, value: Value, origin: ContextId) -> Result<(), StoreError>;

    /// Subscribe to the change feed.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}
