//! Command-line interface: `reloj validate | info | simulate`

mod args;
mod commands;
mod logging;

pub use args::{parse_args, Cli, Command, InfoArgs, OutputFormat, SimulateArgs, ValidateArgs};
pub use commands::{replay, run_command, SimulationSummary};
pub use logging::{init_tracing, LogLevel};
