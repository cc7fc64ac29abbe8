//! `vidpace` command-line adapter.
//!
//! Wires the SQLite speed store, settings and core services together and
//! exposes them as subcommands. `main.rs` only parses arguments, sets up
//! logging and dispatches.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
