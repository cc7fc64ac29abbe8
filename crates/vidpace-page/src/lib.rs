//! In-memory document adapter for vidpace.
//!
//! Implements the media surface and toast ports without a browser, so the
//! enforcement subsystem can be driven end to end from tests and the CLI:
//!
//! - [`VirtualDocument`] - a document with a mutation feed and markers
//! - [`VirtualMediaElement`] - a media element with a configurable rate
//!   behaviour and real listener dispatch
//! - [`VirtualToast`] - a toast overlay that records what it shows

mod document;
mod element;
mod toast;

pub use document::VirtualDocument;
pub use element::{RateBehavior, VirtualMediaElement};
pub use toast::{ToastState, VirtualToast};
