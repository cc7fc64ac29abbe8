//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the per-site playback speed store.
#[derive(Parser)]
#[command(name = "vidpace")]
#[command(about = "Remember and enforce video playback speed per site")]
#[command(version)]
pub struct Cli {
    /// Speed database to use instead of the default location
    #[arg(long = "db", global = true, env = "VIDPACE_DB")]
    pub db: Option<PathBuf>,

    /// JSON settings overrides (timing windows, presets, exemptions)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["vidpace", "list", "--verbose", "--db", "/tmp/speeds.db"]);
        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/speeds.db")));
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn test_set_parses_speed() {
        let cli = Cli::parse_from(["vidpace", "set", "https://video.example/", "1.75"]);
        match cli.command {
            Some(Commands::Set { url, speed }) => {
                assert_eq!(url, "https://video.example/");
                assert_eq!(speed, 1.75);
            }
            _ => panic!("expected set command"),
        }
    }

    #[test]
    fn test_demo_defaults() {
        let cli = Cli::parse_from(["vidpace", "demo"]);
        match cli.command {
            Some(Commands::Demo { host, steps }) => {
                assert_eq!(host, "video.example");
                assert_eq!(steps, 10);
            }
            _ => panic!("expected demo command"),
        }
    }
}
