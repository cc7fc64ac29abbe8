//! Transient speed notification.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::SpeedValue;
use crate::ports::{SpeedNotifier, ToastSurface};
use crate::services::Debouncer;

/// Id of the overlay element.
pub const TOAST_ELEMENT_ID: &str = "speed-toast";

/// Overlay stylesheet; works in normal and fullscreen modes.
pub const TOAST_STYLESHEET: &str = r"#speed-toast {
  position: fixed;
  left: 50%;
  bottom: 25vh;
  transform: translateX(-50%);
  background: rgba(0, 0, 0, 0.8);
  color: white;
  padding: 12px 24px;
  border-radius: 20px;
  font-family: system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  font-size: 18px;
  font-weight: 500;
  z-index: 2147483647;
  transition: opacity 0.15s ease-in-out;
  opacity: 0;
  pointer-events: none;
}";

/// Shows `"<speed>x"` and hides it after a fixed duration.
///
/// A new speed while visible replaces the text and restarts the timer.
pub struct ToastNotifier {
    surface: Arc<dyn ToastSurface>,
    hide: Debouncer,
}

impl ToastNotifier {
    /// Install the overlay on `surface`.
    pub fn new(surface: Arc<dyn ToastSurface>, duration: Duration) -> Self {
        surface.install(TOAST_ELEMENT_ID, TOAST_STYLESHEET);
        Self {
            surface,
            hide: Debouncer::new(duration),
        }
    }

    /// Text shown for `speed`.
    pub fn format(speed: SpeedValue) -> String {
        format!("{speed}x")
    }
}

impl SpeedNotifier for ToastNotifier {
    fn speed_changed(&self, speed: SpeedValue) {
        self.surface.show(&Self::format(speed));
        let surface = self.surface.clone();
        self.hide.schedule(async move { surface.hide() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSurface {
        log: Mutex<Vec<String>>,
    }

    impl ToastSurface for RecordingSurface {
        fn install(&self, element_id: &str, _stylesheet: &str) {
            self.log.lock().unwrap().push(format!("install {element_id}"));
        }

        fn show(&self, text: &str) {
            self.log.lock().unwrap().push(format!("show {text}"));
        }

        fn hide(&self) {
            self.log.lock().unwrap().push("hide".to_string());
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(ToastNotifier::format(SpeedValue::DEFAULT), "1x");
        assert_eq!(
            ToastNotifier::format(SpeedValue::from_request(1.5).unwrap()),
            "1.5x"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_restarts_on_each_change() {
        let surface = Arc::new(RecordingSurface::default());
        let notifier = ToastNotifier::new(surface.clone(), Duration::from_millis(750));

        notifier.speed_changed(SpeedValue::from_request(1.05).unwrap());
        tokio::time::sleep(Duration::from_millis(500)).await;
        notifier.speed_changed(SpeedValue::from_request(1.1).unwrap());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(surface.log.lock().unwrap().last().unwrap(), "show 1.1x");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(
            *surface.log.lock().unwrap(),
            vec!["install speed-toast", "show 1.05x", "show 1.1x", "hide"]
        );
    }
}
