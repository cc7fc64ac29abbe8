//! Speed-change notification ports.

use crate::domain::SpeedValue;

/// Consumer of "speed changed" events.
///
/// Fire-and-forget: implementations must not block and never fail.
pub trait SpeedNotifier: Send + Sync {
    /// Called after a new speed has been applied.
    fn speed_changed(&self, speed: SpeedValue);
}

/// A notifier that discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl SpeedNotifier for NoopNotifier {
    fn speed_changed(&self, _speed: SpeedValue) {}
}

/// The overlay element a toast is rendered into.
pub trait ToastSurface: Send + Sync {
    /// Install the overlay element and its stylesheet.
    fn install(&self, element_id: &str, stylesheet: &str);

    /// Show `text` at full opacity.
    fn show(&self, text: &str);

    /// Fade the overlay out.
    fn hide(&self);
}

/// A toast surface with nothing to render into.
#[derive(Debug, Clone, Default)]
pub struct NoopToastSurface;

impl ToastSurface for NoopToastSurface {
    fn install(&self, _element_id: &str, _stylesheet: &str) {}

    fn show(&self, _text: &str) {}

    fn hide(&self) {}
}
