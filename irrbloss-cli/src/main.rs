//! ## irrbloss-cli
//! **Operational interface**
//! Entrypoint for the chaff generator: production mode on a monitor-mode
//! interface, or deterministic simulation against the in-memory radio.
//!
//! ### Expectations:
//! - POSIX-compliant argument parsing
//! - Configuration from defaults, YAML and `IRRBLOSS_*` environment
//!
//! ### Future:
//! - Status subcommand reading a running instance's snapshot output

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
