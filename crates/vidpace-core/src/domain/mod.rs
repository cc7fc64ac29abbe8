//! Pure domain types.
//!
//! Nothing in here touches a store, a document or a timer. Services in
//! [`crate::services`] combine these types with the ports.

mod context;
mod domain_key;
mod speed;
mod speed_map;
mod tab;

pub use context::ContextId;
pub use domain_key::DomainKey;
pub use speed::{DEFAULT_SPEED, MAX_SPEED, MIN_SPEED, SPEED_STEP, SpeedValue, round_to_hundredths};
pub use speed_map::{DOMAIN_SPEEDS_KEY, DomainSpeedMap};
pub use tab::{ActiveTab, NavigationId, TabId, TabStatus, TabUpdate};
