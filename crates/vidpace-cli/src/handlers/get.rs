//! Get command handler.

use anyhow::Result;
use vidpace_core::{CoreError, SpeedValue};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::resolve_target;

/// Print the stored speed for a site, or the default.
pub async fn execute(ctx: &CliContext, url: &str) -> Result<()> {
    let target = resolve_target(url)?;
    let stored = ctx
        .prefs()
        .speed_for(&target.domain)
        .await
        .map_err(|e| CliError::from(CoreError::from(e)))?;

    match stored {
        Some(speed) => println!("{}: {:.2}", target.domain, speed.get()),
        None => println!("{}: {:.2} (default)", target.domain, SpeedValue::DEFAULT.get()),
    }
    Ok(())
}
