//! Playback speed value type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Slowest speed any media element is driven at.
pub const MIN_SPEED: f64 = 0.1;

/// Fastest speed any media element is driven at.
pub const MAX_SPEED: f64 = 16.0;

/// Speed used when nothing is stored for a domain, and the reset target.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Increment used by keyboard chords and popup fine-adjust buttons.
pub const SPEED_STEP: f64 = 0.05;

/// Round to two decimal places.
///
/// Applied after every relative adjustment so repeated steps never drift
/// (ten `+0.05` steps from `1.0` land on exactly `1.5`).
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A playback rate clamped to `[MIN_SPEED, MAX_SPEED]`.
///
/// The full numeric precision is kept in memory; [`SpeedValue::persisted`]
/// and the `Display` impl use two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeedValue(f64);

impl SpeedValue {
    /// The default (reset) speed.
    pub const DEFAULT: Self = Self(DEFAULT_SPEED);

    /// Validate a requested speed from any command source.
    ///
    /// Returns `None` for NaN, infinities, zero and negative values.
    /// Anything else is clamped into range.
    pub fn from_request(requested: f64) -> Option<Self> {
        if !requested.is_finite() || requested <= 0.0 {
            return None;
        }
        Some(Self(requested.clamp(MIN_SPEED, MAX_SPEED)))
    }

    /// The raw rate.
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Speed after a relative step, rounded to hundredths and clamped.
    #[must_use]
    pub fn adjusted(self, delta: f64) -> Self {
        if !delta.is_finite() {
            return self;
        }
        Self(round_to_hundredths(self.0 + delta).clamp(MIN_SPEED, MAX_SPEED))
    }

    /// Value written to the store.
    pub fn persisted(self) -> f64 {
        round_to_hundredths(self.0)
    }

    /// Whether this is the default speed.
    pub fn is_default(self) -> bool {
        self.0 == DEFAULT_SPEED
    }
}

impl Default for SpeedValue {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SpeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!("{:.2}", self.0);
        let trimmed = text.trim_end_matches('0').trim_end_matches('.');
        f.write_str(trimmed)
    }
}
