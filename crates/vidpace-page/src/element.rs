//! Virtual media element.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::trace;

use vidpace_core::{
    ListenerToken, MediaElement, MediaElementId, MediaError, MediaEventKind, MediaListener,
};

/// How an element reacts to rate writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateBehavior {
    /// Accepts any rate.
    Free,
    /// Silently keeps its current rate.
    Locked,
    /// Throws on every write.
    Rejecting,
}

struct Registration {
    token: ListenerToken,
    event: MediaEventKind,
    listener: MediaListener,
}

/// A media element living in a [`crate::VirtualDocument`].
///
/// Rate changes dispatch `RateChange` to listeners after the write, the
/// way a browser queues `ratechange`. Dispatch happens with no lock held,
/// so listeners may write the rate again.
pub struct VirtualMediaElement {
    id: MediaElementId,
    rate: Mutex<f64>,
    behavior: RateBehavior,
    listeners: Mutex<Vec<Registration>>,
    next_token: AtomicU64,
    rate_writes: AtomicU64,
}

impl VirtualMediaElement {
    pub(crate) fn new(id: MediaElementId, behavior: RateBehavior) -> Self {
        Self {
            id,
            rate: Mutex::new(1.0),
            behavior,
            listeners: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(1),
            rate_writes: AtomicU64::new(0),
        }
    }

    /// The element's rate behaviour.
    pub const fn behavior(&self) -> RateBehavior {
        self.behavior
    }

    /// Number of accepted rate writes that changed the rate.
    pub fn rate_writes(&self) -> u64 {
        self.rate_writes.load(Ordering::SeqCst)
    }

    /// Page script writes the rate, bypassing any lock.
    pub fn page_sets_rate(&self, rate: f64) {
        if self.store_rate(rate) {
            self.dispatch(MediaEventKind::RateChange);
        }
    }

    /// Playback starts.
    pub fn play(&self) {
        self.dispatch(MediaEventKind::Play);
    }

    /// A new source loads: the player resets to 1x, then metadata arrives.
    pub fn load_source(&self) {
        self.store_rate(1.0);
        self.dispatch(MediaEventKind::LoadedMetadata);
    }

    /// Fire `event` on every listener registered for it.
    pub fn dispatch(&self, event: MediaEventKind) {
        let listeners: Vec<MediaListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.event == event)
            .map(|r| r.listener.clone())
            .collect();

        trace!(element = %self.id, ?event, listeners = listeners.len(), "Dispatching");
        for listener in listeners {
            listener(self);
        }
    }

    /// Store `rate`. Returns whether it changed.
    fn store_rate(&self, rate: f64) -> bool {
        let mut current = self.rate.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == rate {
            return false;
        }
        *current = rate;
        self.rate_writes.fetch_add(1, Ordering::SeqCst);
        true
    }
}

impl MediaElement for VirtualMediaElement {
    fn id(&self) -> MediaElementId {
        self.id
    }

    fn playback_rate(&self) -> f64 {
        *self.rate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_playback_rate(&self, rate: f64) -> Result<(), MediaError> {
        match self.behavior {
            RateBehavior::Free => {
                if self.store_rate(rate) {
                    self.dispatch(MediaEventKind::RateChange);
                }
                Ok(())
            }
            RateBehavior::Locked => Ok(()),
            RateBehavior::Rejecting => Err(MediaError::Rejected {
                rate,
                reason: "NotSupportedError".to_string(),
            }),
        }
    }

    fn add_listener(&self, event: MediaEventKind, listener: MediaListener) -> ListenerToken {
        let token = ListenerToken(self.next_token.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                token,
                event,
                listener,
            });
        token
    }

    fn remove_listener(&self, token: ListenerToken) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|r| r.token != token);
        listeners.len() != before
    }

    fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
