//! Speed state controller.
//!
//! Single source of truth for "what speed should all media on this page
//! be". Reconciles keyboard and message commands, store change echoes,
//! DOM insertions and the periodic drift check without feedback loops.
//!
//! # Concurrency Model
//!
//! - Applying a speed to media is synchronous and never debounced
//! - Persistence is debounced (cancel-and-replace, at most one pending)
//! - Store reads/writes are the only suspension points
//! - Echoes of local writes are ignored while the suppression window is
//!   open or when the change carries this context's id

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::domain::{ContextId, DEFAULT_SPEED, DomainKey, SpeedValue};
use crate::ports::{SpeedNotifier, StoreChange};
use crate::services::{ApplyReport, Debouncer, MediaScanner, SpeedCell, SpeedPreferences, SuppressionWindow};
use crate::settings::ControllerTiming;

/// Where a speed command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedOrigin {
    /// In-page keyboard chord.
    Keyboard,
    /// Message from the popup or another context.
    Message,
    /// A store change written by another context.
    RemoteEcho,
}

impl SpeedOrigin {
    /// Whether a change from this origin is written back to the store.
    pub const fn persists(self) -> bool {
        !matches!(self, Self::RemoteEcho)
    }
}

/// Result of a set/adjust/reset command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedOutcome {
    /// The speed changed and was applied.
    Applied {
        previous: SpeedValue,
        current: SpeedValue,
        report: ApplyReport,
    },
    /// The clamped request equals the current speed.
    Unchanged(SpeedValue),
    /// The request was not a usable speed.
    Rejected,
}

/// Result of handling a store change for this domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteOutcome {
    /// Applied the remote speed.
    Applied(SpeedValue),
    /// The change carried this context's id.
    SelfCaused,
    /// A local write's suppression window was open.
    Suppressed,
    /// The domain has no entry in the new map.
    Absent,
    /// The reported speed equals the current one.
    Unchanged,
    /// The stored value is not a usable speed.
    Invalid,
}

/// Controller for one document context.
pub struct SpeedController {
    context: ContextId,
    domain: Option<DomainKey>,
    speed: SpeedCell,
    scanner: Arc<MediaScanner>,
    prefs: SpeedPreferences,
    notifier: Arc<dyn SpeedNotifier>,
    pending_save: Debouncer,
    suppression: SuppressionWindow,
    /// Bumped on every applied change; lets `initialize` detect commands
    /// that arrived while the stored speed was loading.
    generation: AtomicU64,
}

impl SpeedController {
    /// Create a controller.
    ///
    /// `speed` must be the same cell the scanner's listeners read.
    pub fn new(
        domain: Option<DomainKey>,
        speed: SpeedCell,
        scanner: Arc<MediaScanner>,
        prefs: SpeedPreferences,
        notifier: Arc<dyn SpeedNotifier>,
        timing: &ControllerTiming,
    ) -> Self {
        Self {
            context: ContextId::next(),
            domain,
            speed,
            scanner,
            prefs,
            notifier,
            pending_save: Debouncer::new(timing.save_debounce),
            suppression: SuppressionWindow::new(timing.suppression_window),
            generation: AtomicU64::new(0),
        }
    }

    /// This context's id, attached to every write it makes.
    pub const fn context(&self) -> ContextId {
        self.context
    }

    /// The domain this controller persists under, if the page has one.
    pub const fn domain(&self) -> Option<&DomainKey> {
        self.domain.as_ref()
    }

    /// The authoritative speed.
    pub fn current_speed(&self) -> SpeedValue {
        self.speed.get()
    }

    /// The scanner driving this document's media.
    pub fn scanner(&self) -> &Arc<MediaScanner> {
        &self.scanner
    }

    /// Whether a debounced write is waiting to fire.
    pub fn has_pending_save(&self) -> bool {
        self.pending_save.is_pending()
    }

    /// Load the stored speed for this domain and apply it.
    ///
    /// Loading is not a mutation: nothing is persisted and no toast is
    /// shown. Store failures fall back to the default speed.
    pub async fn initialize(&self) -> SpeedValue {
        let generation = self.generation.load(Ordering::Acquire);

        let loaded = match &self.domain {
            Some(domain) => match self.prefs.speed_for(domain).await {
                Ok(stored) => stored.unwrap_or_default(),
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Error loading saved speed");
                    SpeedValue::DEFAULT
                }
            },
            None => SpeedValue::DEFAULT,
        };

        if self.generation.load(Ordering::Acquire) != generation {
            debug!("Speed changed while loading, keeping the newer value");
            self.scanner.rescan();
            return self.speed.get();
        }

        self.speed.set(loaded);
        let report = self.scanner.rescan();
        debug!(
            domain = ?self.domain.as_ref().map(DomainKey::as_str),
            speed = %loaded,
            elements = report.total,
            "Loaded saved speed"
        );
        loaded
    }

    /// Set the speed.
    ///
    /// Clamps authoritatively, applies to media immediately, schedules a
    /// debounced write unless the change is a remote echo, and notifies.
    /// Applying a remote echo drops any write still pending from this
    /// context.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime when the speed changes and
    /// is persisted: the debounced write is a spawned task.
    pub fn set_speed(&self, requested: f64, origin: SpeedOrigin) -> SpeedOutcome {
        let Some(speed) = SpeedValue::from_request(requested) else {
            debug!(requested, ?origin, "Ignoring invalid speed request");
            return SpeedOutcome::Rejected;
        };

        let previous = self.speed.get();
        if speed == previous {
            return SpeedOutcome::Unchanged(previous);
        }

        self.speed.set(speed);
        self.generation.fetch_add(1, Ordering::AcqRel);
        let report = self.scanner.apply_to_all(speed);
        debug!(%previous, %speed, ?origin, applied = report.applied, "Speed applied");

        if origin.persists() {
            self.schedule_save(speed);
        } else {
            // A newer value is already stored; an older local write must not
            // overwrite it
            self.pending_save.cancel();
        }
        self.notifier.speed_changed(speed);

        SpeedOutcome::Applied {
            previous,
            current: speed,
            report,
        }
    }

    /// Step the speed by `delta`, rounded to hundredths.
    ///
    /// Same runtime requirement as [`SpeedController::set_speed`].
    pub fn adjust_speed(&self, delta: f64, origin: SpeedOrigin) -> SpeedOutcome {
        if !delta.is_finite() {
            return SpeedOutcome::Rejected;
        }
        let target = self.speed.get().adjusted(delta);
        self.set_speed(target.get(), origin)
    }

    /// Return to the default speed.
    ///
    /// Same runtime requirement as [`SpeedController::set_speed`].
    pub fn reset(&self, origin: SpeedOrigin) -> SpeedOutcome {
        self.set_speed(DEFAULT_SPEED, origin)
    }

    /// Handle a store change report for this domain.
    ///
    /// `origin` is the writer's context when the store knows it.
    ///
    /// Does not spawn: applied remote values are never persisted.
    pub fn on_remote_change(&self, reported: Option<f64>, origin: Option<ContextId>) -> RemoteOutcome {
        if origin == Some(self.context) {
            debug!("Ignoring store change written by this context");
            return RemoteOutcome::SelfCaused;
        }
        if self.suppression.is_active() {
            debug!(?reported, "Ignoring store change inside suppression window");
            return RemoteOutcome::Suppressed;
        }
        let Some(raw) = reported else {
            return RemoteOutcome::Absent;
        };
        let Some(speed) = SpeedValue::from_request(raw) else {
            debug!(raw, "Ignoring invalid stored speed");
            return RemoteOutcome::Invalid;
        };

        match self.set_speed(speed.get(), SpeedOrigin::RemoteEcho) {
            SpeedOutcome::Applied { current, .. } => {
                info!(speed = %current, "Updating speed from storage change");
                RemoteOutcome::Applied(current)
            }
            SpeedOutcome::Unchanged(_) | SpeedOutcome::Rejected => RemoteOutcome::Unchanged,
        }
    }

    /// Route a raw store change. Returns `None` for changes that do not
    /// concern this controller.
    pub fn handle_store_change(&self, change: &StoreChange) -> Option<RemoteOutcome> {
        let domain = self.domain.as_ref()?;
        let reported = SpeedPreferences::decode_change(change, domain)?;
        Some(self.on_remote_change(reported, change.origin))
    }

    /// The document's media surface may have changed: rescan and re-apply.
    pub fn on_dom_surface_changed(&self) -> ApplyReport {
        self.scanner.rescan()
    }

    /// Re-assert the speed only if some element drifted. Returns whether a
    /// write happened.
    pub fn periodic_reconcile(&self) -> bool {
        let speed = self.speed.get();
        if !self.scanner.has_drift(speed) {
            return false;
        }
        let report = self.scanner.apply_to_all(speed);
        debug!(%speed, applied = report.applied, rejected = report.rejected, "Reconciled drifted media");
        true
    }

    /// Drop any pending write and detach enforcement listeners.
    pub fn shutdown(&self) {
        self.pending_save.cancel();
        self.scanner.detach_all();
    }

    fn schedule_save(&self, speed: SpeedValue) {
        let Some(domain) = self.domain.clone() else {
            debug!("No domain for this page, not persisting speed");
            return;
        };
        let prefs = self.prefs.clone();
        let suppression = self.suppression.clone();
        let origin = self.context;

        self.pending_save.schedule(async move {
            suppression.engage();
            match prefs.save_speed(&domain, speed, origin).await {
                Ok(_) => info!(domain = %domain, %speed, "Saved speed"),
                Err(e) => warn!(domain = %domain, %speed, error = %e, "Error saving speed"),
            }
            suppression.release_after_window();
        });
    }
}

impl Drop for SpeedController {
    fn drop(&mut self) {
        self.pending_save.cancel();
    }
}
