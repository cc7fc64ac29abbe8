//! Store setup and initialization.

use std::path::Path;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::SqliteSpeedStore;

/// Opens (creating if needed) the `SQLite` store at `db_path`.
///
/// # Example
///
/// ```rust,no_run
/// use vidpace_store::open_store;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = open_store(Path::new("/path/to/speeds.db")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn open_store(db_path: &Path) -> Result<SqliteSpeedStore> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true),
    )
    .await?;

    let store = SqliteSpeedStore::new(pool);
    store.ensure_table().await?;
    Ok(store)
}

/// Opens a fresh in-memory store for tests.
///
/// Uses a single connection: every `sqlite::memory:` connection is its own
/// database.
pub async fn open_test_store() -> Result<SqliteSpeedStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = SqliteSpeedStore::new(pool);
    store.ensure_table().await?;
    Ok(store)
}
