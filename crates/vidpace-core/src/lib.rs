//! Core domain types, ports and services for vidpace.
//!
//! vidpace keeps every video on a page at a chosen playback speed and
//! remembers that speed per site. This crate holds everything that does
//! not depend on a browser or a storage backend:
//!
//! - `domain` - speed values, domain keys, the persisted speed map
//! - `ports` - traits for the store, the document, toasts, injection and
//!   inter-context messaging
//! - `services` - the speed controller, media scanner, mutation watch,
//!   toast notifier, command sources, popup session, injection gatekeeper
//!   and page session
//! - `settings` - timing windows and data-driven policy lists

pub mod contracts;
pub mod domain;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use contracts::{ContextMessage, ContextReply};
pub use domain::{
    ActiveTab, ContextId, DEFAULT_SPEED, DOMAIN_SPEEDS_KEY, DomainKey, DomainSpeedMap, MAX_SPEED,
    MIN_SPEED, NavigationId, SPEED_STEP, SpeedValue, TabId, TabStatus, TabUpdate,
};
pub use ports::{
    CoreError, InjectionError, KeyValueStore, ListenerToken, MediaElement, MediaElementId,
    MediaError, MediaEventKind, MediaListener, MediaSurface, MessengerError, MutationBatch,
    MutationKind, NoopNotifier, NoopToastSurface, ScriptInjector, SpeedNotifier, StoreChange,
    StoreError, TabMessenger, ToastSurface,
};
pub use services::{
    ApplyReport, EnforcementPolicy, GateDecision, InjectionGatekeeper, KeyChord, KeyCommand,
    KeyDisposition, MediaScanner, PageSession, PopupSession, PopupView, RemoteOutcome,
    SessionError, SkipReason, SpeedCell, SpeedController, SpeedOrigin, SpeedOutcome,
    SpeedPreferences, ToastNotifier,
};
pub use settings::{ControllerTiming, Settings, SettingsError, SettingsUpdate, validate_settings};

