//! Page session: one attached document context.
//!
//! This is the composition point for a page. It owns the controller and
//! the three background convergence paths (mutation watch, periodic
//! reconcile, store change feed), all stopped by one cancellation token.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::contracts::ContextReply;
use crate::domain::{DomainKey, SpeedValue};
use crate::ports::{KeyValueStore, MediaSurface, SpeedNotifier, ToastSurface};
use crate::services::{
    EnforcementPolicy, KeyChord, KeyDisposition, MediaScanner, MutationWatch, SpeedCell,
    SpeedController, SpeedPreferences, ToastNotifier, dispatch_key, handle_message,
};
use crate::settings::Settings;

/// Document marker set by the first attached session.
pub const ATTACH_MARKER: &str = "vidpace-speed-controller";

/// Errors attaching a session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The controller is already running in this document.
    #[error("Speed controller already attached to this document")]
    AlreadyAttached,
}

/// A running controller bound to one document.
pub struct PageSession {
    controller: Arc<SpeedController>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl PageSession {
    /// Attach to `surface`.
    ///
    /// Fails with [`SessionError::AlreadyAttached`] if a session already
    /// claimed the document. A document without a usable URL still gets
    /// enforcement at the default speed; it just never persists.
    pub async fn attach(
        surface: Arc<dyn MediaSurface>,
        store: Arc<dyn KeyValueStore>,
        toast: Arc<dyn ToastSurface>,
        settings: &Settings,
    ) -> Result<Self, SessionError> {
        if !surface.claim_marker(ATTACH_MARKER) {
            debug!("Controller already loaded in this document");
            return Err(SessionError::AlreadyAttached);
        }

        let timing = settings.timing();
        let location = surface.location();
        let domain = location.as_deref().and_then(DomainKey::from_url);
        if domain.is_none() {
            warn!(?location, "No domain for this document, using default speed");
        }

        let speed = SpeedCell::default();
        let policy = EnforcementPolicy::new(settings.effective_exempt_host_markers());
        let scanner = Arc::new(MediaScanner::new(
            surface.clone(),
            speed.clone(),
            domain.as_ref(),
            &policy,
        ));
        let prefs = SpeedPreferences::new(store);
        let notifier: Arc<dyn SpeedNotifier> =
            Arc::new(ToastNotifier::new(toast, timing.toast_duration));

        // Subscribe before loading so nothing between load and spawn is missed
        let mutations = surface.subscribe_mutations();
        let mut changes = prefs.subscribe();

        let controller = Arc::new(SpeedController::new(
            domain, speed, scanner, prefs, notifier, &timing,
        ));
        let initial = controller.initialize().await;

        let cancel = CancellationToken::new();
        let mut tasks = Vec::with_capacity(3);

        let watch_controller = controller.clone();
        let watch_cancel = cancel.child_token();
        tasks.push(tokio::spawn(async move {
            MutationWatch::new(timing.rescan_delay)
                .run(mutations, watch_cancel, move || {
                    watch_controller.on_dom_surface_changed();
                })
                .await;
        }));

        let reconcile_controller = controller.clone();
        let reconcile_cancel = cancel.child_token();
        tasks.push(tokio::spawn(async move {
            let mut ticker = interval(timing.reconcile_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; initialize already applied
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = reconcile_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        reconcile_controller.periodic_reconcile();
                    }
                }
            }
        }));

        let change_controller = controller.clone();
        let change_cancel = cancel.child_token();
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = change_cancel.cancelled() => break,
                    received = changes.recv() => match received {
                        Ok(change) => {
                            change_controller.handle_store_change(&change);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Store change feed lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        }));

        info!(
            context = %controller.context(),
            domain = ?controller.domain().map(DomainKey::as_str),
            speed = %initial,
            "Speed controller attached"
        );

        Ok(Self {
            controller,
            cancel,
            tasks,
        })
    }

    /// The controller.
    pub const fn controller(&self) -> &Arc<SpeedController> {
        &self.controller
    }

    /// Current authoritative speed.
    pub fn current_speed(&self) -> SpeedValue {
        self.controller.current_speed()
    }

    /// Route a key event.
    pub fn handle_key(&self, chord: &KeyChord) -> KeyDisposition {
        dispatch_key(&self.controller, chord)
    }

    /// Route a message from another context.
    pub fn handle_message(&self, raw: &Value) -> Option<ContextReply> {
        handle_message(&self.controller, raw)
    }

    /// Stop every background task, drop any pending write and detach
    /// enforcement listeners.
    pub async fn detach(mut self) {
        self.stop();
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Session task failed");
                }
            }
        }
        info!(context = %self.controller.context(), "Speed controller detached");
    }

    fn stop(&self) {
        self.cancel.cancel();
        self.controller.shutdown();
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.stop();
    }
}
