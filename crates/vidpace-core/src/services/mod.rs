//! Services: the speed enforcement subsystem and its command sources.
//!
//! Every service depends only on ports, never on concrete adapters.

mod controller;
mod debounce;
mod gatekeeper;
mod keyboard;
mod messaging;
mod mutation_watch;
mod page_session;
mod popup;
mod preferences;
mod scanner;
mod speed_cell;
mod suppression;
mod toast;

pub use controller::{RemoteOutcome, SpeedController, SpeedOrigin, SpeedOutcome};
pub use debounce::Debouncer;
pub use gatekeeper::{GateDecision, InjectionGatekeeper, SkipReason};
pub use keyboard::{KeyChord, KeyCommand, KeyDisposition, dispatch_key};
pub use messaging::handle_message;
pub use mutation_watch::MutationWatch;
pub use page_session::{ATTACH_MARKER, PageSession, SessionError};
pub use popup::{PopupSession, PopupView};
pub use preferences::SpeedPreferences;
pub use scanner::{ApplyReport, EnforcementPolicy, MediaScanner};
pub use speed_cell::SpeedCell;
pub use suppression::SuppressionWindow;
pub use toast::{TOAST_ELEMENT_ID, TOAST_STYLESHEET, ToastNotifier};
