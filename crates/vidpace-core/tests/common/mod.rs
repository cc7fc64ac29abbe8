//! Shared fixtures for vidpace-core integration tests.

use std::sync::Arc;

use vidpace_core::{
    DomainKey, EnforcementPolicy, KeyValueStore, MediaScanner, MediaSurface, Settings, SpeedCell,
    SpeedController, SpeedPreferences, ToastNotifier, ToastSurface,
};
use vidpace_page::{VirtualDocument, VirtualToast};
use vidpace_store::MemorySpeedStore;

/// A controller wired to an in-memory document, store and toast.
pub struct Fixture {
    pub doc: Arc<VirtualDocument>,
    pub store: MemorySpeedStore,
    pub toast: Arc<VirtualToast>,
    pub controller: SpeedController,
}

/// Build a controller for a document at `url` backed by `store`.
pub fn controller_at(url: &str, store: &MemorySpeedStore) -> Fixture {
    let settings = Settings::with_defaults();
    let doc = VirtualDocument::new(url);
    let toast = Arc::new(VirtualToast::new());

    let domain = DomainKey::from_url(url);
    let speed = SpeedCell::default();
    let policy = EnforcementPolicy::new(settings.effective_exempt_host_markers());
    let surface: Arc<dyn MediaSurface> = doc.clone();
    let scanner = Arc::new(MediaScanner::new(
        surface,
        speed.clone(),
        domain.as_ref(),
        &policy,
    ));
    let backend: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let toast_surface: Arc<dyn ToastSurface> = toast.clone();
    let timing = settings.timing();
    let notifier = Arc::new(ToastNotifier::new(toast_surface, timing.toast_duration));

    let controller = SpeedController::new(
        domain,
        speed,
        scanner,
        SpeedPreferences::new(backend),
        notifier,
        &timing,
    );

    Fixture {
        doc,
        store: store.clone(),
        toast,
        controller,
    }
}

/// Comfortably past the default save debounce.
pub const AFTER_SAVE: std::time::Duration = std::time::Duration::from_millis(1500);
