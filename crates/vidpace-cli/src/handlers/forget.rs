//! Forget command handler.

use anyhow::Result;
use vidpace_core::{ContextId, CoreError};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::resolve_target;

/// Remove a site's stored speed.
pub async fn execute(ctx: &CliContext, url: &str) -> Result<()> {
    let target = resolve_target(url)?;
    let removed = ctx
        .prefs()
        .forget(&target.domain, ContextId::next())
        .await
        .map_err(|e| CliError::from(CoreError::from(e)))?;

    if removed {
        println!("Forgot speed for {}", target.domain);
    } else {
        println!("No saved speed for {}", target.domain);
    }
    Ok(())
}
