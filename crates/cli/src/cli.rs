//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use observability::LogFormat;
use std::path::PathBuf;

/// Stereo ingest - stereo camera front end driven by a synthetic rig
#[derive(Parser, Debug)]
#[command(
    name = "stereo-ingest",
    author,
    version,
    about = "Stereo camera ingestion front end",
    long_about = "Correlates left/right images with their calibration records, derives the \n\
                  stereo baseline, normalizes pixels and emits one stereo frame per event.\n\n\
                  Input comes from a synthetic stereo rig described in the configuration; \n\
                  emitted frames are dispatched to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STEREO_INGEST_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (json, pretty, compact)
    #[arg(
        long,
        default_value = "pretty",
        value_parser = parse_log_format,
        global = true,
        env = "STEREO_INGEST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default level used when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn parse_log_format(name: &str) -> Result<LogFormat, String> {
    LogFormat::from_name(name)
        .ok_or_else(|| format!("unknown log format '{name}' (expected json, pretty or compact)"))
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the front end on the synthetic rig
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "STEREO_INGEST_CONFIG"
    )]
    pub config: PathBuf,

    /// Consume packed stereo messages (overrides `subscribe_rgbd`)
    #[arg(long)]
    pub packed: bool,

    /// Use approximate stamp matching (overrides `approx_sync`)
    #[arg(long)]
    pub approx_sync: bool,

    /// Override the rig rate in Hz
    #[arg(long, env = "STEREO_INGEST_RATE_HZ")]
    pub rate_hz: Option<f64>,

    /// Seed of the synthetic rig
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Maximum number of frames to emit (0 = unlimited)
    #[arg(long, default_value = "0", env = "STEREO_INGEST_MAX_FRAMES")]
    pub max_frames: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "STEREO_INGEST_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "STEREO_INGEST_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "STEREO_INGEST_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the static transform tree
    #[arg(long)]
    pub transforms: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::parse_from([
            "stereo-ingest",
            "-v",
            "--log-format",
            "compact",
            "run",
            "--config",
            "rig.toml",
            "--packed",
            "--max-frames",
            "10",
        ]);
        assert_eq!(cli.log_level(), "debug");
        assert!(matches!(cli.log_format, LogFormat::Compact));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("rig.toml"));
                assert!(args.packed);
                assert!(!args.approx_sync);
                assert_eq!(args.max_frames, 10);
                assert_eq!(args.metrics_port, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let result = Cli::try_parse_from(["stereo-ingest", "--log-format", "xml", "info"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_level() {
        let cli = Cli::parse_from(["stereo-ingest", "-q", "validate"]);
        assert_eq!(cli.log_level(), "warn");
    }
}
