//! Key-value store adapters for vidpace.
//!
//! Both adapters implement `vidpace_core::KeyValueStore` and broadcast a
//! change to every subscriber, the writer included, whenever a write
//! actually changes the stored value.

mod memory;
mod setup;
mod sqlite;

pub use memory::MemorySpeedStore;
pub use setup::{open_store, open_test_store};
pub use sqlite::SqliteSpeedStore;

/// Capacity of each store's change feed.
pub(crate) const CHANGE_FEED_CAPACITY: usize = 64;

// libsqlite3-sys is pulled in only for its `bundled` feature
use libsqlite3_sys as _;
