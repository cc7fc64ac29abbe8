//! Media surface port: the document and its playable elements.
//!
//! Implementations wrap a real DOM (or a virtual one for tests and the
//! CLI demo). Everything here is synchronous; enforcement never suspends.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

/// Stable identity of a media element within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaElementId(pub u64);

impl fmt::Display for MediaElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "media-{}", self.0)
    }
}

/// Handle returned by [`MediaElement::add_listener`], used to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// Element events that may reset the playback rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEventKind {
    /// The rate changed (possibly by page code).
    RateChange,
    /// Playback started.
    Play,
    /// Metadata finished loading (players often reset the rate here).
    LoadedMetadata,
}

impl MediaEventKind {
    /// Every event an enforcement listener is attached for.
    pub const ENFORCED: [Self; 3] = [Self::RateChange, Self::Play, Self::LoadedMetadata];
}

/// Errors from writing to a media element.
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    /// The platform refused the rate.
    #[error("Playback rate {rate} rejected: {reason}")]
    Rejected { rate: f64, reason: String },

    /// The element is no longer part of the document.
    #[error("Media element detached")]
    Detached,
}

/// Callback invoked with the element an event fired on.
pub type MediaListener = Arc<dyn Fn(&dyn MediaElement) + Send + Sync>;

/// A playable element exposing a playback-rate control.
pub trait MediaElement: Send + Sync {
    /// Identity used to index enforcement state.
    fn id(&self) -> MediaElementId;

    /// Currently observed playback rate.
    fn playback_rate(&self) -> f64;

    /// Request a new playback rate.
    ///
    /// A platform may silently ignore the request; callers compare
    /// [`MediaElement::playback_rate`] afterwards.
    fn set_playback_rate(&self, rate: f64) -> Result<(), MediaError>;

    /// Attach a listener for `event`.
    fn add_listener(&self, event: MediaEventKind, listener: MediaListener) -> ListenerToken;

    /// Detach a listener. Returns whether it was attached.
    fn remove_listener(&self, token: ListenerToken) -> bool;

    /// Number of listeners currently attached.
    fn listener_count(&self) -> usize;
}

/// What a mutation batch touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// One batch of document-tree mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationBatch {
    pub kind: MutationKind,
    pub added_nodes: usize,
    pub removed_nodes: usize,
}

impl MutationBatch {
    /// A child-list batch inserting `count` nodes.
    pub const fn inserted(count: usize) -> Self {
        Self {
            kind: MutationKind::ChildList,
            added_nodes: count,
            removed_nodes: 0,
        }
    }

    /// Whether the batch inserted at least one descendant node.
    pub const fn has_insertions(&self) -> bool {
        matches!(self.kind, MutationKind::ChildList) && self.added_nodes > 0
    }
}

/// A document hosting media elements.
pub trait MediaSurface: Send + Sync {
    /// URL of the document, if known.
    fn location(&self) -> Option<String>;

    /// All media elements currently in the tree.
    fn media_elements(&self) -> Vec<Arc<dyn MediaElement>>;

    /// Subscribe to tree mutations under the document root.
    fn subscribe_mutations(&self) -> broadcast::Receiver<MutationBatch>;

    /// Set a document-level marker. Returns `false` if it was already set.
    fn claim_marker(&self, marker: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_batch_insertions() {
        assert!(MutationBatch::inserted(1).has_insertions());
        assert!(!MutationBatch::inserted(0).has_insertions());

        let attrs = MutationBatch {
            kind: MutationKind::Attributes,
            added_nodes: 3,
            removed_nodes: 0,
        };
        assert!(!attrs.has_insertions());

        let removal = MutationBatch {
            kind: MutationKind::ChildList,
            added_nodes: 0,
            removed_nodes: 2,
        };
        assert!(!removal.has_insertions());
    }
}
