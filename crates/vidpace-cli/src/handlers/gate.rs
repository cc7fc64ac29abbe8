//! Gate command handler.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;
use vidpace_core::{
    GateDecision, InjectionError, InjectionGatekeeper, NavigationId, ScriptInjector, TabId,
    TabStatus, TabUpdate,
};

use crate::bootstrap::CliContext;

/// Injector that records the decision without touching any tab.
struct DryRunInjector;

#[async_trait]
impl ScriptInjector for DryRunInjector {
    async fn inject(&self, tab: TabId) -> Result<(), InjectionError> {
        debug!(%tab, "Dry run: not injecting");
        Ok(())
    }
}

/// Evaluate a URL as a completed navigation.
pub async fn decide(ctx: &CliContext, url: &str) -> GateDecision {
    let gatekeeper = InjectionGatekeeper::new(
        ctx.settings().effective_excluded_url_schemes(),
        Arc::new(DryRunInjector),
    );
    let update = TabUpdate {
        status: TabStatus::Complete,
        url: Some(url.to_string()),
        navigation_id: NavigationId(1),
    };
    gatekeeper.on_tab_updated(TabId(1), &update).await
}

/// Print whether the controller would be injected into `url`.
pub async fn execute(ctx: &CliContext, url: &str) -> Result<()> {
    match decide(ctx, url).await {
        GateDecision::Injected => println!("inject: {url}"),
        GateDecision::Skipped(reason) => println!("skip: {url} ({reason})"),
        GateDecision::Failed(error) => println!("fail: {url} ({error})"),
    }
    Ok(())
}
