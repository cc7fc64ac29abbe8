//! Settings domain types and validation.
//!
//! Timing windows, the enforcement exemption list and the injection
//! exclusion list are data, not code. All fields are optional so partial
//! configuration files merge over the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Quiet interval before a speed change is persisted.
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1000;

/// How long after a local write acknowledges its echo is ignored.
pub const DEFAULT_SUPPRESSION_WINDOW_MS: u64 = 100;

/// Delay between the first inserting mutation and the rescan.
pub const DEFAULT_RESCAN_DELAY_MS: u64 = 100;

/// Interval of the drift check.
pub const DEFAULT_RECONCILE_INTERVAL_MS: u64 = 1000;

/// How long the toast stays visible.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 750;

/// Hosts whose own player fights forced rates.
pub const DEFAULT_EXEMPT_HOST_MARKERS: &[&str] = &["crunchyroll.com"];

/// Privileged URL schemes the controller is never injected into.
pub const DEFAULT_EXCLUDED_URL_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "edge",
    "about",
    "moz-extension",
    "devtools",
];

/// Popup preset buttons.
pub const DEFAULT_PRESETS: &[f64] = &[0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0, 2.5, 3.0];

/// Application settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Quiet interval (ms) before a speed change is written to the store.
    pub save_debounce_ms: Option<u64>,

    /// Window (ms) after a local write during which store changes are
    /// treated as self-caused.
    pub suppression_window_ms: Option<u64>,

    /// Delay (ms) between a DOM insertion and the rescan it triggers.
    pub rescan_delay_ms: Option<u64>,

    /// Interval (ms) of the periodic drift check.
    pub reconcile_interval_ms: Option<u64>,

    /// How long (ms) the speed toast stays visible.
    pub toast_duration_ms: Option<u64>,

    /// Host substrings exempt from continuous enforcement.
    pub exempt_host_markers: Option<Vec<String>>,

    /// URL schemes never injected into.
    pub excluded_url_schemes: Option<Vec<String>>,

    /// Popup preset speeds.
    pub presets: Option<Vec<f64>>,
}

impl Settings {
    /// Create settings with every default filled in.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            save_debounce_ms: Some(DEFAULT_SAVE_DEBOUNCE_MS),
            suppression_window_ms: Some(DEFAULT_SUPPRESSION_WINDOW_MS),
            rescan_delay_ms: Some(DEFAULT_RESCAN_DELAY_MS),
            reconcile_interval_ms: Some(DEFAULT_RECONCILE_INTERVAL_MS),
            toast_duration_ms: Some(DEFAULT_TOAST_DURATION_MS),
            exempt_host_markers: Some(to_strings(DEFAULT_EXEMPT_HOST_MARKERS)),
            excluded_url_schemes: Some(to_strings(DEFAULT_EXCLUDED_URL_SCHEMES)),
            presets: Some(DEFAULT_PRESETS.to_vec()),
        }
    }

    /// Timing windows with default fallbacks.
    pub fn timing(&self) -> ControllerTiming {
        let ms = |value: Option<u64>, default: u64| Duration::from_millis(value.unwrap_or(default));
        ControllerTiming {
            save_debounce: ms(self.save_debounce_ms, DEFAULT_SAVE_DEBOUNCE_MS),
            suppression_window: ms(self.suppression_window_ms, DEFAULT_SUPPRESSION_WINDOW_MS),
            rescan_delay: ms(self.rescan_delay_ms, DEFAULT_RESCAN_DELAY_MS),
            reconcile_interval: ms(self.reconcile_interval_ms, DEFAULT_RECONCILE_INTERVAL_MS),
            toast_duration: ms(self.toast_duration_ms, DEFAULT_TOAST_DURATION_MS),
        }
    }

    /// Effective exemption markers.
    pub fn effective_exempt_host_markers(&self) -> Vec<String> {
        self.exempt_host_markers
            .clone()
            .unwrap_or_else(|| to_strings(DEFAULT_EXEMPT_HOST_MARKERS))
    }

    /// Effective excluded schemes.
    pub fn effective_excluded_url_schemes(&self) -> Vec<String> {
        self.excluded_url_schemes
            .clone()
            .unwrap_or_else(|| to_strings(DEFAULT_EXCLUDED_URL_SCHEMES))
    }

    /// Effective popup presets.
    pub fn effective_presets(&self) -> Vec<f64> {
        self.presets
            .clone()
            .unwrap_or_else(|| DEFAULT_PRESETS.to_vec())
    }

    /// Merge an update into this one, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(value) = other.save_debounce_ms {
            self.save_debounce_ms = value;
        }
        if let Some(value) = other.suppression_window_ms {
            self.suppression_window_ms = value;
        }
        if let Some(value) = other.rescan_delay_ms {
            self.rescan_delay_ms = value;
        }
        if let Some(value) = other.reconcile_interval_ms {
            self.reconcile_interval_ms = value;
        }
        if let Some(value) = other.toast_duration_ms {
            self.toast_duration_ms = value;
        }
        if let Some(ref markers) = other.exempt_host_markers {
            self.exempt_host_markers.clone_from(markers);
        }
        if let Some(ref schemes) = other.excluded_url_schemes {
            self.excluded_url_schemes.clone_from(schemes);
        }
        if let Some(ref presets) = other.presets {
            self.presets.clone_from(presets);
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub save_debounce_ms: Option<Option<u64>>,
    pub suppression_window_ms: Option<Option<u64>>,
    pub rescan_delay_ms: Option<Option<u64>>,
    pub reconcile_interval_ms: Option<Option<u64>>,
    pub toast_duration_ms: Option<Option<u64>>,
    pub exempt_host_markers: Option<Option<Vec<String>>>,
    pub excluded_url_schemes: Option<Option<Vec<String>>>,
    pub presets: Option<Option<Vec<f64>>>,
}

/// Resolved timing windows consumed by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerTiming {
    pub save_debounce: Duration,
    pub suppression_window: Duration,
    pub rescan_delay: Duration,
    pub reconcile_interval: Duration,
    pub toast_duration: Duration,
}

impl Default for ControllerTiming {
    fn default() -> Self {
        Settings::default().timing()
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Save debounce must be between 50 and 60,000 ms, got {0}")]
    InvalidSaveDebounce(u64),

    #[error("{name} must be at most 5,000 ms, got {value}")]
    WindowTooLong { name: &'static str, value: u64 },

    #[error("Reconcile interval must be between 100 and 60,000 ms, got {0}")]
    InvalidReconcileInterval(u64),

    #[error("Preset speed must be between 0.1 and 16, got {0}")]
    InvalidPreset(f64),

    #[error("Exemption markers and excluded schemes cannot be empty strings")]
    EmptyMarker,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(debounce) = settings.save_debounce_ms {
        if !(50..=60_000).contains(&debounce) {
            return Err(SettingsError::InvalidSaveDebounce(debounce));
        }
    }

    for (name, value) in [
        ("Suppression window", settings.suppression_window_ms),
        ("Rescan delay", settings.rescan_delay_ms),
    ] {
        if let Some(value) = value {
            if value > 5000 {
                return Err(SettingsError::WindowTooLong { name, value });
            }
        }
    }

    if let Some(interval) = settings.reconcile_interval_ms {
        if !(100..=60_000).contains(&interval) {
            return Err(SettingsError::InvalidReconcileInterval(interval));
        }
    }

    if let Some(presets) = &settings.presets {
        if let Some(bad) = presets
            .iter()
            .find(|p| !(crate::domain::MIN_SPEED..=crate::domain::MAX_SPEED).contains(*p))
        {
            return Err(SettingsError::InvalidPreset(*bad));
        }
    }

    let markers = settings.exempt_host_markers.iter().flatten();
    let schemes = settings.excluded_url_schemes.iter().flatten();
    if markers.chain(schemes).any(|m| m.trim().is_empty()) {
        return Err(SettingsError::EmptyMarker);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.save_debounce_ms, Some(1000));
        assert_eq!(settings.suppression_window_ms, Some(100));
        assert_eq!(
            settings.exempt_host_markers,
            Some(vec!["crunchyroll.com".to_string()])
        );
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_timing_falls_back_to_defaults() {
        let timing = Settings::default().timing();
        assert_eq!(timing.save_debounce, Duration::from_millis(1000));
        assert_eq!(timing.suppression_window, Duration::from_millis(100));
        assert_eq!(timing.rescan_delay, Duration::from_millis(100));
        assert_eq!(timing.reconcile_interval, Duration::from_secs(1));
        assert_eq!(timing.toast_duration, Duration::from_millis(750));
        assert_eq!(timing, ControllerTiming::default());
    }

    #[test]
    fn test_validate_debounce_out_of_range() {
        let settings = Settings {
            save_debounce_ms: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidSaveDebounce(10))
        ));
    }

    #[test]
    fn test_validate_window_too_long() {
        let settings = Settings {
            rescan_delay_ms: Some(10_000),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::WindowTooLong { value: 10_000, .. })
        ));
    }

    #[test]
    fn test_validate_reconcile_interval() {
        let settings = Settings {
            reconcile_interval_ms: Some(5),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidReconcileInterval(5))
        ));
    }

    #[test]
    fn test_validate_presets() {
        let settings = Settings {
            presets: Some(vec![1.0, 20.0]),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPreset(p)) if p == 20.0
        ));
    }

    #[test]
    fn test_validate_empty_marker() {
        let settings = Settings {
            exempt_host_markers: Some(vec![String::new()]),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::EmptyMarker)
        ));
    }

    #[test]
    fn test_merge_settings() {
        let mut settings = Settings::with_defaults();
        let update = SettingsUpdate {
            save_debounce_ms: Some(Some(500)),
            exempt_host_markers: Some(Some(vec!["example.tv".to_string()])),
            toast_duration_ms: Some(None),
            ..Default::default()
        };
        settings.merge(&update);

        assert_eq!(settings.save_debounce_ms, Some(500));
        assert_eq!(
            settings.effective_exempt_host_markers(),
            vec!["example.tv".to_string()]
        );
        assert_eq!(settings.toast_duration_ms, None);
        assert_eq!(settings.timing().toast_duration, Duration::from_millis(750));
        assert_eq!(settings.suppression_window_ms, Some(100)); // Unchanged
    }

    #[test]
    fn test_update_deserializes_partially() {
        let update: SettingsUpdate =
            serde_json::from_str(r#"{ "rescan_delay_ms": 250 }"#).unwrap();
        assert_eq!(update.rescan_delay_ms, Some(Some(250)));
        assert!(update.presets.is_none());
    }
}
