//! Shared handle to a context's authoritative speed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::SpeedValue;

/// Cheaply clonable cell holding the current speed of one context.
///
/// The controller is the only writer. Enforcement listeners hold clones
/// and read it whenever they fire.
#[derive(Debug, Clone)]
pub struct SpeedCell {
    bits: Arc<AtomicU64>,
}

impl SpeedCell {
    /// Create a cell holding `speed`.
    pub fn new(speed: SpeedValue) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(speed.get().to_bits())),
        }
    }

    /// Current speed.
    pub fn get(&self) -> SpeedValue {
        let raw = f64::from_bits(self.bits.load(Ordering::Acquire));
        SpeedValue::from_request(raw).unwrap_or_default()
    }

    pub(crate) fn set(&self, speed: SpeedValue) {
        self.bits.store(speed.get().to_bits(), Ordering::Release);
    }
}

impl Default for SpeedCell {
    fn default() -> Self {
        Self::new(SpeedValue::DEFAULT)
    }
}
