//! Reloj CLI
//!
//! # Usage
//!
//! ```bash
//! # Check a config, resolving epoch intervals against a dataset of 50k samples
//! reloj validate run.yaml --dataset-length 50000 --detailed
//!
//! # Show the config with defaults filled in
//! reloj info run.toml --format json
//!
//! # Print every step, evaluation and LR update of a run
//! reloj simulate run.yaml --dataset-length 50000 --max-iterations 2000
//! ```

use clap::Parser;
use reloj::cli::{init_tracing, run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(LogLevel::from_flags(cli.quiet, cli.verbose)) {
        eprintln!("Warning: {e}");
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
