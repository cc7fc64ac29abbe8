//! Demo command handler.
//!
//! Attaches a controller to a virtual page on the configured store and
//! walks it through the lifecycle a real page sees: load, late video
//! insertion, keyboard steps, a page script resetting the rate, and the
//! debounced save.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use vidpace_core::{CoreError, KeyChord, MediaElement, PageSession};
use vidpace_page::{VirtualDocument, VirtualToast};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::resolve_target;

/// Slack added on top of each timing window before observing its effect.
const SETTLE: Duration = Duration::from_millis(50);

/// Run the demo against `host`.
pub async fn execute(ctx: &CliContext, host: &str, steps: u32) -> Result<()> {
    let target = resolve_target(host)?;
    let timing = ctx.settings().timing();

    let doc = VirtualDocument::new(target.url.clone());
    let toast = Arc::new(VirtualToast::new());
    let session = PageSession::attach(doc.clone(), ctx.store(), toast.clone(), ctx.settings())
        .await
        .map_err(|e| CliError::from(CoreError::from(e)))?;
    println!("attached  {} at {}x", target.domain, session.current_speed());

    let video = doc.insert_video();
    tokio::time::sleep(timing.rescan_delay + SETTLE).await;
    println!(
        "inserted  video at {}x with {} listeners",
        video.playback_rate(),
        video.listener_count()
    );

    let chord = KeyChord::meta_alt("Equal");
    for _ in 0..steps {
        session.handle_key(&chord);
    }
    println!(
        "stepped   {steps} times to {}x (toast \"{}\")",
        session.current_speed(),
        toast.state().text
    );

    video.page_sets_rate(1.0);
    println!("page set  1x, enforced back to {}x", video.playback_rate());

    tokio::time::sleep(timing.save_debounce + timing.suppression_window + SETTLE).await;
    let stored = ctx
        .prefs()
        .speed_for(&target.domain)
        .await
        .map_err(|e| CliError::from(CoreError::from(e)))?;
    match stored {
        Some(speed) => println!("stored    {}: {speed}x", target.domain),
        None => println!("stored    nothing for {}", target.domain),
    }

    session.detach().await;
    Ok(())
}
