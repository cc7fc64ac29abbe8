//! Media surface scanner.
//!
//! Translates "enforce speed S" into rate writes on every media element of
//! one document and keeps per-element enforcement listeners attached.
//!
//! # Design
//!
//! - Enforcement state lives in an arena keyed by [`MediaElementId`]
//! - Attaching always detaches the previous listeners for that element
//!   first, so repeated scans never accumulate handlers
//! - One element's failure is logged and never stops the others

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::domain::{DomainKey, SpeedValue};
use crate::ports::{ListenerToken, MediaElement, MediaElementId, MediaEventKind, MediaListener, MediaSurface};
use crate::services::SpeedCell;

/// Data-driven list of hosts exempt from continuous enforcement.
///
/// On an exempt host only scan-time rate writes happen; no listeners are
/// attached, because the host's own player manages the rate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnforcementPolicy {
    exempt_markers: Vec<String>,
}

impl EnforcementPolicy {
    /// Create a policy from host substrings.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exempt_markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether listeners must not be attached on `domain`.
    pub fn is_exempt(&self, domain: Option<&DomainKey>) -> bool {
        domain.is_some_and(|d| self.exempt_markers.iter().any(|m| d.contains_marker(m)))
    }
}

/// Outcome of writing a speed to every element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Elements found in the document.
    pub total: usize,
    /// Elements now reporting the requested rate.
    pub applied: usize,
    /// Elements that refused or ignored the rate.
    pub rejected: usize,
}

/// Enforcement state for one element.
struct MediaElementHandle {
    element: Arc<dyn MediaElement>,
    tokens: Vec<ListenerToken>,
}

/// Scanner bound to one document.
pub struct MediaScanner {
    surface: Arc<dyn MediaSurface>,
    speed: SpeedCell,
    exempt: bool,
    handles: Mutex<HashMap<MediaElementId, MediaElementHandle>>,
}

impl MediaScanner {
    /// Create a scanner for `surface`.
    ///
    /// Listeners re-assert whatever `speed` holds at the time they fire.
    pub fn new(
        surface: Arc<dyn MediaSurface>,
        speed: SpeedCell,
        domain: Option<&DomainKey>,
        policy: &EnforcementPolicy,
    ) -> Self {
        let exempt = policy.is_exempt(domain);
        if exempt {
            debug!(domain = ?domain.map(DomainKey::as_str), "Host exempt from enforcement listeners");
        }
        Self {
            surface,
            speed,
            exempt,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Whether this document is exempt from enforcement listeners.
    pub const fn is_exempt(&self) -> bool {
        self.exempt
    }

    /// Write `speed` to every element currently in the document.
    pub fn apply_to_all(&self, speed: SpeedValue) -> ApplyReport {
        let elements = self.surface.media_elements();
        let mut report = ApplyReport {
            total: elements.len(),
            ..ApplyReport::default()
        };
        for element in &elements {
            if apply_rate(element.as_ref(), speed) {
                report.applied += 1;
            } else {
                report.rejected += 1;
            }
        }
        report
    }

    /// Re-scan the document: attach enforcement to every element (unless
    /// exempt), forget elements that left the tree, and apply the current
    /// speed.
    ///
    /// Idempotent; safe to call arbitrarily often.
    pub fn rescan(&self) -> ApplyReport {
        let elements = self.surface.media_elements();
        self.forget_missing(&elements);

        if !self.exempt {
            for element in &elements {
                self.attach_enforcement(element);
            }
        }

        let speed = self.speed.get();
        let mut report = ApplyReport {
            total: elements.len(),
            ..ApplyReport::default()
        };
        for element in &elements {
            if apply_rate(element.as_ref(), speed) {
                report.applied += 1;
            } else {
                report.rejected += 1;
            }
        }
        report
    }

    /// Attach the three enforcement listeners to `element`, detaching any
    /// previously attached instances first.
    pub fn attach_enforcement(&self, element: &Arc<dyn MediaElement>) {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = handles.remove(&element.id()) {
            for token in previous.tokens {
                previous.element.remove_listener(token);
            }
        }

        let tokens = MediaEventKind::ENFORCED
            .iter()
            .map(|&kind| element.add_listener(kind, self.enforcement_listener(kind)))
            .collect();

        handles.insert(
            element.id(),
            MediaElementHandle {
                element: element.clone(),
                tokens,
            },
        );
    }

    /// Whether any element's observed rate differs from `speed`.
    pub fn has_drift(&self, speed: SpeedValue) -> bool {
        self.surface
            .media_elements()
            .iter()
            .any(|element| element.playback_rate() != speed.get())
    }

    /// Number of elements with enforcement attached.
    pub fn tracked(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Detach every enforcement listener.
    pub fn detach_all(&self) {
        let drained: Vec<_> = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        for handle in drained {
            for token in handle.tokens {
                handle.element.remove_listener(token);
            }
        }
    }

    fn forget_missing(&self, present: &[Arc<dyn MediaElement>]) {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|id, handle| {
            let keep = present.iter().any(|element| element.id() == *id);
            if !keep {
                for token in handle.tokens.drain(..) {
                    handle.element.remove_listener(token);
                }
            }
            keep
        });
    }

    fn enforcement_listener(&self, kind: MediaEventKind) -> MediaListener {
        let speed = self.speed.clone();
        Arc::new(move |element: &dyn MediaElement| {
            let target = speed.get();
            // Only rate changes are conditional; play and metadata always re-assert
            if kind == MediaEventKind::RateChange && element.playback_rate() == target.get() {
                return;
            }
            if let Err(e) = element.set_playback_rate(target.get()) {
                warn!(element = %element.id(), error = %e, "Could not re-assert playback rate");
            }
        })
    }
}

impl Drop for MediaScanner {
    fn drop(&mut self) {
        self.detach_all();
    }
}

/// Write `speed` to one element. Returns whether it took effect.
fn apply_rate(element: &dyn MediaElement, speed: SpeedValue) -> bool {
    if let Err(e) = element.set_playback_rate(speed.get()) {
        warn!(element = %element.id(), error = %e, "Cannot set playback rate on this element");
        return false;
    }
    let observed = element.playback_rate();
    if observed != speed.get() {
        warn!(
            element = %element.id(),
            requested = speed.get(),
            observed,
            "Playback rate not allowed on this element"
        );
        return false;
    }
    true
}
