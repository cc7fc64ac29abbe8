//! Set command handler.
//!
//! Runs the popup's speed change path for the site. There is no live page
//! behind the CLI, so the tab message has no receiver; open pages pick the
//! value up from the store change feed.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;
use vidpace_core::{
    ActiveTab, ContextMessage, ContextReply, CoreError, MessengerError, PopupSession, TabId,
    TabMessenger,
};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::resolve_target;

/// Tab id standing in for the page the CLI is "over".
const CLI_TAB: TabId = TabId(0);

/// Messenger for a popup with no page behind it.
struct DetachedMessenger;

#[async_trait]
impl TabMessenger for DetachedMessenger {
    async fn send(&self, tab: TabId, message: ContextMessage) -> Result<ContextReply, MessengerError> {
        debug!(%tab, ?message, "No page to deliver to");
        Err(MessengerError::NoReceiver(tab))
    }
}

/// Store a speed for a site.
pub async fn execute(ctx: &CliContext, url: &str, speed: f64) -> Result<()> {
    let target = resolve_target(url)?;
    let active_tab = ActiveTab {
        id: CLI_TAB,
        url: Some(target.url.clone()),
    };
    let mut popup = PopupSession::open(
        Some(active_tab),
        ctx.prefs().clone(),
        Arc::new(DetachedMessenger),
        ctx.settings().effective_presets(),
    )
    .await;

    let applied = popup
        .handle_speed_change(speed)
        .await
        .ok_or_else(|| CliError::Arguments(format!("'{speed}' is not a usable speed")))?;

    // The popup only logs store failures; confirm the write landed
    let stored = ctx
        .prefs()
        .speed_for(&target.domain)
        .await
        .map_err(|e| CliError::from(CoreError::from(e)))?;
    if stored != Some(applied) {
        return Err(CliError::Database(format!("speed for {} was not saved", target.domain)).into());
    }

    if applied.get() == speed {
        println!("{}: {:.2}", target.domain, applied.get());
    } else {
        println!("{}: {:.2} (clamped from {speed})", target.domain, applied.get());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidpace_core::{KeyValueStore, Settings};
    use vidpace_store::MemorySpeedStore;

    use crate::bootstrap::bootstrap_with;

    fn context(store: &MemorySpeedStore) -> CliContext {
        let backend: Arc<dyn KeyValueStore> = Arc::new(store.clone());
        bootstrap_with(backend, Settings::with_defaults())
    }

    #[tokio::test]
    async fn test_set_persists_clamped_speed() {
        let store = MemorySpeedStore::new();
        let ctx = context(&store);

        execute(&ctx, "www.video.example", 40.0).await.unwrap();

        let target = resolve_target("video.example").unwrap();
        let stored = ctx.prefs().speed_for(&target.domain).await.unwrap();
        assert_eq!(stored.map(|s| s.get()), Some(16.0));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_set_rejects_unusable_speed() {
        let store = MemorySpeedStore::new();
        let ctx = context(&store);

        let err = execute(&ctx, "video.example", -1.0).await.unwrap_err();
        let cli_err = err.downcast_ref::<CliError>().unwrap();
        assert_eq!(cli_err.exit_code(), 2);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_set_reports_unavailable_store() {
        let store = MemorySpeedStore::new();
        store.set_unavailable(true);
        let ctx = context(&store);

        let err = execute(&ctx, "video.example", 2.0).await.unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
    }
}
