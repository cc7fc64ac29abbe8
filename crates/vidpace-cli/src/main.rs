//! CLI entry point.
//!
//! Bootstrap composes the store and settings into a `CliContext`;
//! command dispatch routes to handlers.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use vidpace_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // No command provided - show help
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::resolve(cli.db, cli.config.as_deref())?;
    let ctx = bootstrap(config).await?;

    match command {
        Commands::Get { url } => handlers::get::execute(&ctx, &url).await?,
        Commands::Set { url, speed } => handlers::set::execute(&ctx, &url, speed).await?,
        Commands::List => handlers::list::execute(&ctx).await?,
        Commands::Forget { url } => handlers::forget::execute(&ctx, &url).await?,
        Commands::Gate { url } => handlers::gate::execute(&ctx, &url).await?,
        Commands::Demo { host, steps } => handlers::demo::execute(&ctx, &host, steps).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}
