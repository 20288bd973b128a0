//! Info command implementation

use crate::cli::logging::log;
use crate::cli::{InfoArgs, LogLevel, OutputFormat};
use crate::config::load_config;

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let config =
        load_config(&args.config).map_err(|e| format!("Config error [{}]: {e}", e.code()))?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, "Configuration Info:");
            println!();
            println!("Duration: {}", config.training.duration);
            println!("Batch size: {}", config.training.batch_size);
            println!("Gradient accumulation: {}", config.training.gradient_accumulation);
            println!("Evaluation interval: {}", config.training.evaluation_interval);
            println!(
                "Optimizer: {:?} (lr={})",
                config.optimizer.optimizer, config.optimizer.learning_rate
            );
            println!(
                "LR scheduler: {:?} (update every {})",
                config.lr_scheduler.kind, config.lr_scheduler.update_interval
            );

            if !config.lr_scheduler.warmup.is_zero() {
                println!("Warmup: {}", config.lr_scheduler.warmup);
            }
            if config.clock.verbose {
                println!("Clock logging: verbose");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}
