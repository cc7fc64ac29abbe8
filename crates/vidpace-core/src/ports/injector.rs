//! Script injection port used by the injection gatekeeper.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::TabId;

/// Errors from injecting the controller bundle.
#[derive(Debug, Clone, Error)]
pub enum InjectionError {
    #[error("Tab {0} no longer exists")]
    TabClosed(TabId),

    #[error("Injection refused: {0}")]
    Refused(String),
}

/// Loads the controller bundle into a tab.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    /// Inject into `tab`. Resolves once the bundle has been evaluated.
    async fn inject(&self, tab: TabId) -> Result<(), InjectionError>;
}
