//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core services expect from the
//! browser, the page and the storage backend. They contain no
//! implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No browser API or database types in any signature
//! - Document access is synchronous, store access is async
//! - Failures are typed per port and reduced to log entries by services

pub mod injector;
pub mod media;
pub mod messenger;
pub mod notifier;
pub mod store;

use thiserror::Error;

pub use injector::{InjectionError, ScriptInjector};
pub use media::{
    ListenerToken, MediaElement, MediaElementId, MediaError, MediaEventKind, MediaListener,
    MediaSurface, MutationBatch, MutationKind,
};
pub use messenger::{MessengerError, TabMessenger};
pub use notifier::{NoopNotifier, NoopToastSurface, SpeedNotifier, ToastSurface};
pub use store::{KeyValueStore, StoreChange, StoreError};

use crate::settings::SettingsError;

/// Errors surfaced by the core at its outer boundary (CLI, session setup).
///
/// Enforcement paths never return these: Store and media failures are
/// logged where they happen.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Settings validation failed.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Page session could not be attached.
    #[error(transparent)]
    Session(#[from] crate::services::SessionError),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),
}
