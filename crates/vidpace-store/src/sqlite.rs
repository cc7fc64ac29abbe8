//! `SQLite` implementation of the `KeyValueStore` trait.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use tokio::sync::broadcast;
use tracing::debug;

use vidpace_core::{ContextId, KeyValueStore, StoreChange, StoreError};

use crate::CHANGE_FEED_CAPACITY;

/// `SQLite` implementation of the `KeyValueStore` trait.
///
/// Stores each value as a JSON blob in a key-value table. The change feed
/// only sees writes made through this instance; the writer's origin is
/// reported there and not persisted.
pub struct SqliteSpeedStore {
    pool: SqlitePool,
    changes: broadcast::Sender<StoreChange>,
}

impl SqliteSpeedStore {
    /// Create a new `SQLite` store on an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            changes: broadcast::channel(CHANGE_FEED_CAPACITY).0,
        }
    }

    /// Ensure the key-value table exists.
    ///
    /// Call this during initialization to set up the schema.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS store_kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    /// The underlying pool.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteSpeedStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT value FROM store_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match row {
            Some(r) => {
                let json: String = r.get("value");
                serde_json::from_str(&json)
                    .map(Some)
                    .map_err(|e| StoreError::Serialization(e.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, origin: ContextId) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(&value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let updated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let previous: Option<String> = sqlx::query("SELECT value FROM store_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .map(|r| r.get("value"));

        sqlx::query("INSERT OR REPLACE INTO store_kv (key, value, updated_at) VALUES (?, ?, ?)")
        .bind(key)
        .bind(&json)
        .bind(&updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Rejected(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        let old_value = previous.and_then(|p| serde_json::from_str::<Value>(&p).ok());
        if old_value.as_ref() == Some(&value) {
            return Ok(());
        }

        let change = StoreChange {
            key: key.to_string(),
            old_value,
            new_value: Some(value),
            origin: Some(origin),
        };
        if self.changes.send(change).is_err() {
            debug!(key, "No change subscribers");
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_test_store;
    use serde_json::json;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = open_test_store().await.unwrap();
        assert_eq!(store.get("domainSpeeds").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = open_test_store().await.unwrap();
        let value = json!({ "example.com": 1.5, "video.example": 2.0 });

        assert_ok!(store.set("domainSpeeds", value.clone(), ContextId::next()).await);
        assert_eq!(store.get("domainSpeeds").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_change_feed_reports_old_and_new() {
        let store = open_test_store().await.unwrap();
        let mut feed = store.subscribe();
        let origin = ContextId::next();

        store.set("k", json!(1), origin).await.unwrap();
        store.set("k", json!(1), origin).await.unwrap();
        store.set("k", json!(2), origin).await.unwrap();

        let first = feed.recv().await.unwrap();
        assert_eq!(first.old_value, None);
        assert_eq!(first.new_value, Some(json!(1)));

        let second = feed.recv().await.unwrap();
        assert_eq!(second.old_value, Some(json!(1)));
        assert_eq!(second.new_value, Some(json!(2)));
        assert_eq!(second.origin, Some(origin));
        assert!(feed.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_serialization_error() {
        let store = open_test_store().await.unwrap();
        sqlx::query("INSERT INTO store_kv (key, value, updated_at) VALUES ('k', '{nope', 'now')")
            .execute(store.pool())
            .await
            .unwrap();

        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_schema_has_no_origin_column() {
        let store = open_test_store().await.unwrap();
        store
            .set("k", json!(1), ContextId::next())
            .await
            .unwrap();

        let columns: Vec<String> = sqlx::query("SELECT name FROM pragma_table_info('store_kv')")
            .fetch_all(store.pool())
            .await
            .unwrap()
            .iter()
            .map(|r| r.get("name"))
            .collect();
        assert_eq!(columns, vec!["key", "value", "updated_at"]);
    }
}
