//! Virtual toast overlay.

use std::sync::{Mutex, PoisonError};

use vidpace_core::ToastSurface;

/// Observable state of the overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastState {
    pub element_id: Option<String>,
    pub stylesheet_installed: bool,
    pub text: String,
    pub visible: bool,
    pub shown: usize,
}

/// Toast overlay that records what it was asked to render.
#[derive(Debug, Default)]
pub struct VirtualToast {
    state: Mutex<ToastState>,
}

impl VirtualToast {
    /// Create an uninstalled overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the overlay.
    pub fn state(&self) -> ToastState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ToastSurface for VirtualToast {
    fn install(&self, element_id: &str, stylesheet: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.element_id = Some(element_id.to_string());
        state.stylesheet_installed = !stylesheet.is_empty();
    }

    fn show(&self, text: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.text = text.to_string();
        state.visible = true;
        state.shown += 1;
    }

    fn hide(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .visible = false;
    }
}
