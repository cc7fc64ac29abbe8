//! Injection gatekeeper.
//!
//! Decides, per completed navigation, whether the controller bundle is
//! loaded into a tab. Privileged pages are filtered by URL scheme; every
//! other document gets exactly one injection per navigation.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{NavigationId, TabId, TabStatus, TabUpdate};
use crate::ports::ScriptInjector;

/// Why an update did not lead to an injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The page has not finished loading.
    StillLoading,
    /// The update carried no URL.
    NoUrl,
    /// The URL could not be parsed.
    InvalidUrl,
    /// The URL's scheme is privileged.
    ExcludedScheme(String),
    /// This navigation was already handled.
    AlreadyInjected,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StillLoading => f.write_str("page still loading"),
            Self::NoUrl => f.write_str("no URL"),
            Self::InvalidUrl => f.write_str("invalid URL"),
            Self::ExcludedScheme(scheme) => write!(f, "privileged scheme '{scheme}'"),
            Self::AlreadyInjected => f.write_str("already injected for this navigation"),
        }
    }
}

/// Outcome of a tab update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Injected,
    Skipped(SkipReason),
    /// The injector failed; logged, never retried.
    Failed(String),
}

/// Per-navigation injection gate.
pub struct InjectionGatekeeper {
    excluded_schemes: Vec<String>,
    injector: Arc<dyn ScriptInjector>,
    injected: Mutex<HashMap<TabId, NavigationId>>,
}

impl InjectionGatekeeper {
    /// Create a gatekeeper excluding `excluded_schemes` (without `:`).
    pub fn new(excluded_schemes: Vec<String>, injector: Arc<dyn ScriptInjector>) -> Self {
        Self {
            excluded_schemes: excluded_schemes
                .into_iter()
                .map(|s| s.trim_end_matches(':').to_ascii_lowercase())
                .collect(),
            injector,
            injected: Mutex::new(HashMap::new()),
        }
    }

    /// Pure URL check, without navigation bookkeeping.
    pub fn evaluate_url(&self, url: &str) -> Result<(), SkipReason> {
        let parsed = Url::parse(url).map_err(|_| SkipReason::InvalidUrl)?;
        let scheme = parsed.scheme();
        if self.excluded_schemes.iter().any(|s| s == scheme) {
            return Err(SkipReason::ExcludedScheme(scheme.to_string()));
        }
        Ok(())
    }

    /// Handle a tab update.
    pub async fn on_tab_updated(&self, tab: TabId, update: &TabUpdate) -> GateDecision {
        if update.status != TabStatus::Complete {
            return GateDecision::Skipped(SkipReason::StillLoading);
        }
        let Some(url) = update.url.as_deref() else {
            return GateDecision::Skipped(SkipReason::NoUrl);
        };
        if let Err(reason) = self.evaluate_url(url) {
            debug!(%tab, url, ?reason, "Not injecting");
            return GateDecision::Skipped(reason);
        }

        {
            let mut injected = self.injected.lock().unwrap_or_else(PoisonError::into_inner);
            if injected.get(&tab) == Some(&update.navigation_id) {
                return GateDecision::Skipped(SkipReason::AlreadyInjected);
            }
            injected.insert(tab, update.navigation_id);
        }

        match self.injector.inject(tab).await {
            Ok(()) => {
                info!(%tab, url, "Injected speed controller");
                GateDecision::Injected
            }
            Err(e) => {
                warn!(%tab, url, error = %e, "Injection failed");
                GateDecision::Failed(e.to_string())
            }
        }
    }

    /// Forget a closed tab.
    pub fn on_tab_removed(&self, tab: TabId) {
        self.injected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&tab);
    }
}
