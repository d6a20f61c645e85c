use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use irrbloss_config::{ConfigError, IrrblossConfig};
use irrbloss_engine::{run_production_mode, run_simulation_mode};
use irrbloss_telemetry::logging::EventLogger;
use irrbloss_telemetry::metrics::MetricsRecorder;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run in production mode (live injection and capture)
    Run(RunArgs),
    /// Run a deterministic simulation against the in-memory radio
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file; defaults and environment apply without one
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured monitor-mode interface
    #[arg(short, long)]
    pub interface: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Configuration file; defaults and environment apply without one
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Number of channel hops to simulate
    #[arg(long, default_value_t = 50)]
    pub hops: u64,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    #[arg(long)]
    pub validate_hash: Option<String>,
}

pub async fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match cli.command {
        Commands::Run(args) => {
            let mut config = load_config(args.config.as_deref())?;
            if let Some(interface) = args.interface {
                config.radio.interface = interface;
            }
            init_telemetry(&config);
            run_production_mode(config, MetricsRecorder::new()).await
        }
        Commands::Simulate(args) => {
            let config = load_config(args.config.as_deref())?;
            init_telemetry(&config);
            let report = run_simulation_mode(
                config,
                args.hops,
                args.seed,
                args.validate_hash.as_deref(),
                MetricsRecorder::new(),
            )
            .await?;
            println!("hops:         {}", report.hops);
            println!(
                "frames:       {} ({} noise)",
                report.total_frames, report.noise_frames
            );
            println!("2.4 GHz:      {}", report.frames_2g);
            println!("5 GHz:        {}", report.frames_5g);
            println!("interactions: {}", report.interactions);
            println!("state hash:   {}", report.state_hash);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<IrrblossConfig, ConfigError> {
    match path {
        Some(path) => IrrblossConfig::load_from_path(path),
        None => IrrblossConfig::load(),
    }
}

/// Log level and format come from the loaded configuration; `RUST_LOG`
/// still overrides both.
fn init_telemetry(config: &IrrblossConfig) {
    EventLogger::init_with(
        &config.telemetry.log_level,
        config.telemetry.log_format == "json",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_defaults_parse() {
        let cli = Cli::try_parse_from(["irrbloss", "simulate"]).unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.hops, 50);
                assert_eq!(args.seed, 0);
                assert!(args.validate_hash.is_none());
                assert!(args.config.is_none());
            }
            Commands::Run(_) => panic!("expected the simulate subcommand"),
        }
    }

    #[test]
    fn run_accepts_config_and_interface_overrides() {
        let cli = Cli::try_parse_from([
            "irrbloss",
            "run",
            "--config",
            "config/irrbloss.yaml",
            "--interface",
            "wlan1mon",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, Some(PathBuf::from("config/irrbloss.yaml")));
                assert_eq!(args.interface.as_deref(), Some("wlan1mon"));
            }
            Commands::Simulate(_) => panic!("expected the run subcommand"),
        }
    }

    #[test]
    fn validate_hash_flag_parses() {
        let cli = Cli::try_parse_from([
            "irrbloss",
            "simulate",
            "--hops",
            "5",
            "--seed",
            "42",
            "--validate-hash",
            "abc123",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.hops, 5);
                assert_eq!(args.seed, 42);
                assert_eq!(args.validate_hash.as_deref(), Some("abc123"));
            }
            Commands::Run(_) => panic!("expected the simulate subcommand"),
        }
    }
}
