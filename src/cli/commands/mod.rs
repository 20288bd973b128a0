//! CLI command implementations

mod info;
mod simulate;
mod validate;


pub use simulate::{replay, SimulationSummary};

use crate::cli::{Cli, Command, LogLevel};
use crate::config::{load_config, validate_config, BaseConfig};
use crate::schedule::DeclaredSchedule;
use std::path::Path;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
        Command::Simulate(args) => simulate::run_simulate(args, log_level),
    }
}

/// Load and validate a configuration file
fn load_validated(path: &Path) -> Result<(BaseConfig, DeclaredSchedule), String> {
    let config = load_config(path).map_err(|e| format!("Config error [{}]: {e}", e.code()))?;
    let declared =
        validate_config(&config).map_err(|e| format!("Validation failed [{}]: {e}", e.code()))?;
    Ok((config, declared))
}
