//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reloj: training-loop time accounting
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "reloj")]
#[command(version)]
#[command(about = "Validate training schedules and simulate when a run steps, evaluates and updates its learning rate")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Validate a configuration file
    Validate(ValidateArgs),

    /// Display a configuration with all defaults filled in
    Info(InfoArgs),

    /// Replay a run batch by batch and print every scheduling event
    Simulate(SimulateArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML or TOML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Number of samples in the training set; also binds epoch-based intervals
    #[arg(long, value_name = "N")]
    pub dataset_length: Option<u64>,

    /// Show detailed validation report
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML or TOML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the simulate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SimulateArgs {
    /// Path to YAML or TOML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Number of samples in the training set
    #[arg(long, value_name = "N")]
    pub dataset_length: u64,

    /// Stop after this many iterations even if the run is not done
    #[arg(long, value_name = "M")]
    pub max_iterations: Option<u64>,
}

/// Output format for the info command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => Err(format!("Unknown output format: {s}. Valid formats: text, json, yaml")),
        }
    }
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
