//! Echo suppression window for local store writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Marks store changes as self-caused while a local write is in flight
/// and for a short window after it acknowledges.
///
/// Overlapping writes each hold the window open; it closes once the last
/// one's window has elapsed.
#[derive(Debug, Clone)]
pub struct SuppressionWindow {
    window: Duration,
    in_flight: Arc<AtomicUsize>,
}

impl SuppressionWindow {
    /// Create a window of the given length.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Open the window before a write begins.
    pub fn engage(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    /// Close this write's share of the window once the window has elapsed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn release_after_window(&self) {
        let in_flight = self.in_flight.clone();
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            in_flight.fetch_sub(1, Ordering::AcqRel);
        });
    }

    /// Whether changes arriving now should be treated as self-caused.
    pub fn is_active(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }
}
