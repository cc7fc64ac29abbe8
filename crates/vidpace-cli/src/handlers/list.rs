//! List command handler.

use anyhow::Result;
use vidpace_core::CoreError;

use crate::bootstrap::CliContext;
use crate::error::CliError;

const DOMAIN_WIDTH: usize = 40;

/// Print every stored site speed, sorted by domain.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let map = ctx
        .prefs()
        .load_map()
        .await
        .map_err(|e| CliError::from(CoreError::from(e)))?;

    if map.is_empty() {
        println!("No saved speeds.");
        return Ok(());
    }

    println!("{:<DOMAIN_WIDTH$} {:>6}", "DOMAIN", "SPEED");
    println!("{}", "-".repeat(DOMAIN_WIDTH + 7));
    for (domain, speed) in map.iter() {
        println!("{domain:<DOMAIN_WIDTH$} {speed:>6.2}");
    }
    println!();
    println!("{} site(s)", map.len());
    Ok(())
}
