//! Virtual document.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::trace;

use vidpace_core::{MediaElement, MediaElementId, MediaSurface, MutationBatch, MutationKind};

use crate::{RateBehavior, VirtualMediaElement};

const MUTATION_FEED_CAPACITY: usize = 256;

/// A document tree reduced to what the controller observes: its URL, its
/// media elements, a mutation feed and document-level markers.
pub struct VirtualDocument {
    url: Option<String>,
    media: Mutex<Vec<Arc<VirtualMediaElement>>>,
    markers: Mutex<HashSet<String>>,
    mutations: broadcast::Sender<MutationBatch>,
    next_id: AtomicU64,
}

impl VirtualDocument {
    /// Create an empty document at `url`.
    pub fn new(url: impl Into<String>) -> Arc<Self> {
        Self::build(Some(url.into()))
    }

    /// Create a document with no URL (e.g. a sandboxed frame).
    pub fn without_location() -> Arc<Self> {
        Self::build(None)
    }

    fn build(url: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            url,
            media: Mutex::new(Vec::new()),
            markers: Mutex::new(HashSet::new()),
            mutations: broadcast::channel(MUTATION_FEED_CAPACITY).0,
            next_id: AtomicU64::new(1),
        })
    }

    /// Insert a free media element.
    pub fn insert_video(&self) -> Arc<VirtualMediaElement> {
        self.insert_media(RateBehavior::Free)
    }

    /// Insert a media element with the given behaviour.
    pub fn insert_media(&self, behavior: RateBehavior) -> Arc<VirtualMediaElement> {
        let id = MediaElementId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let element = Arc::new(VirtualMediaElement::new(id, behavior));
        self.media
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(element.clone());
        self.notify(MutationBatch::inserted(1));
        element
    }

    /// Insert `count` non-media nodes (infinite-scroll churn).
    pub fn insert_nodes(&self, count: usize) {
        self.notify(MutationBatch::inserted(count));
    }

    /// Change an attribute somewhere in the tree.
    pub fn touch_attribute(&self) {
        self.notify(MutationBatch {
            kind: MutationKind::Attributes,
            added_nodes: 0,
            removed_nodes: 0,
        });
    }

    /// Remove a media element. Returns whether it was present.
    pub fn remove_media(&self, id: MediaElementId) -> bool {
        let removed = {
            let mut media = self.media.lock().unwrap_or_else(PoisonError::into_inner);
            let before = media.len();
            media.retain(|element| element.id() != id);
            media.len() != before
        };
        if removed {
            self.notify(MutationBatch {
                kind: MutationKind::ChildList,
                added_nodes: 0,
                removed_nodes: 1,
            });
        }
        removed
    }

    /// Media elements in insertion order.
    pub fn videos(&self) -> Vec<Arc<VirtualMediaElement>> {
        self.media
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `marker` has been claimed.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(marker)
    }

    fn notify(&self, batch: MutationBatch) {
        if self.mutations.send(batch).is_err() {
            trace!(?batch, "No mutation observers");
        }
    }
}

impl MediaSurface for VirtualDocument {
    fn location(&self) -> Option<String> {
        self.url.clone()
    }

    fn media_elements(&self) -> Vec<Arc<dyn MediaElement>> {
        self.videos()
            .into_iter()
            .map(|element| element as Arc<dyn MediaElement>)
            .collect()
    }

    fn subscribe_mutations(&self) -> broadcast::Receiver<MutationBatch> {
        self.mutations.subscribe()
    }

    fn claim_marker(&self, marker: &str) -> bool {
        self.markers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(marker.to_string())
    }
}
