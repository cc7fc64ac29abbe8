//! Inter-context message channel port.

use async_trait::async_trait;
use thiserror::Error;

use crate::contracts::{ContextMessage, ContextReply};
use crate::domain::TabId;

/// Errors from delivering a message to a tab.
#[derive(Debug, Clone, Error)]
pub enum MessengerError {
    /// No controller is listening in the tab.
    #[error("No receiver in {0}")]
    NoReceiver(TabId),

    #[error("Message channel closed: {0}")]
    Closed(String),
}

/// Sends command messages from the popup to a page context.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TabMessenger: Send + Sync {
    /// Deliver `message` to the controller in `tab` and await its reply.
    async fn send(&self, tab: TabId, message: ContextMessage) -> Result<ContextReply, MessengerError>;
}
