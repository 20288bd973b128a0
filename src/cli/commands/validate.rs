//! Validate command implementation

use super::load_validated;
use crate::cli::logging::log;
use crate::cli::{LogLevel, ValidateArgs};
use crate::config::BaseConfig;
use crate::schedule::{DeclaredSchedule, Schedule};

/// Format training configuration as a string
pub fn format_training_info(config: &BaseConfig) -> String {
    let training = &config.training;
    let mut lines = vec![
        format!("  Duration: {}", training.duration),
        format!("  Batch size: {}", training.batch_size),
        format!("  Gradient accumulation: {}", training.gradient_accumulation),
        format!("  Evaluation interval: {}", training.evaluation_interval),
    ];
    if let Some(clip) = training.gradient_clipping_max_norm {
        lines.push(format!("  Gradient clipping: {clip}"));
    }
    lines.push(format!("  Device: {} ({})", training.device, training.dtype));
    lines.join("\n")
}

/// Format optimizer configuration as a string
pub fn format_optimizer_info(config: &BaseConfig) -> String {
    let optimizer = &config.optimizer;
    [
        format!("  Optimizer: {:?}", optimizer.optimizer),
        format!("  Learning rate: {}", optimizer.learning_rate),
        format!("  Weight decay: {}", optimizer.weight_decay),
    ]
    .join("\n")
}

/// Format per-model overrides as a string
pub fn format_models_info(config: &BaseConfig) -> Option<String> {
    if config.models.is_empty() {
        return None;
    }
    let mut lines = vec!["  Models:".to_string()];
    for (name, model) in &config.models {
        let params = model.optimizer_params(&config.optimizer);
        let trainable = match model.requires_grad {
            Some(true) => ", trainable",
            Some(false) => ", frozen",
            None => "",
        };
        lines.push(format!("    {name}: lr={}{trainable}", params.learning_rate));
    }
    Some(lines.join("\n"))
}

/// Format LR scheduler configuration as a string
pub fn format_scheduler_info(config: &BaseConfig) -> String {
    let scheduler = &config.lr_scheduler;
    let mut lines = vec![
        format!("  LR scheduler: {:?}", scheduler.kind),
        format!("  Update interval: {}", scheduler.update_interval),
    ];
    if !scheduler.warmup.is_zero() {
        lines.push(format!("  Warmup: {}", scheduler.warmup));
    }
    lines.join("\n")
}

/// Format a schedule bound to a dataset as a string
pub fn format_schedule_info(schedule: &Schedule) -> String {
    let clock = schedule.clock();
    let mut lines = vec![
        "  Resolved schedule:".to_string(),
        format!("    Iterations per epoch: {}", clock.iterations_per_epoch()),
        format!("    Iterations per step: {}", clock.iterations_per_step()),
        format!("    Total iterations: {}", schedule.total_iterations()),
        format!(
            "    Evaluate every: {} iterations",
            clock.resolve(schedule.evaluation().interval())
        ),
        format!(
            "    Update LR every: {} iterations",
            clock.resolve(schedule.lr_update().interval())
        ),
    ];
    let warmup = clock.resolve(schedule.warmup().warmup());
    if warmup > 0 {
        lines.push(format!("    Warmup: {warmup} iterations"));
    }
    lines.join("\n")
}

/// Print detailed configuration summary
pub fn print_detailed_summary(config: &BaseConfig, schedule: Option<&Schedule>) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_training_info(config));
    println!();
    println!("{}", format_optimizer_info(config));
    println!();
    println!("{}", format_scheduler_info(config));

    if let Some(models) = format_models_info(config) {
        println!();
        println!("{models}");
    }

    if let Some(schedule) = schedule {
        println!();
        println!("{}", format_schedule_info(schedule));
    }
}

/// Bind the declared schedule when a dataset length was given
fn bind_if_known(
    config: &BaseConfig,
    declared: &DeclaredSchedule,
    dataset_length: Option<u64>,
) -> Result<Option<Schedule>, String> {
    let Some(length) = dataset_length else {
        return Ok(None);
    };
    let context = config
        .run_context(Some(length))
        .map_err(|e| format!("Validation failed [{}]: {e}", e.code()))?;
    declared
        .bind(context)
        .map(Some)
        .map_err(|e| format!("Validation failed [{}]: {e}", e.code()))
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("Validating config: {}", args.config.display()));

    let (config, declared) = load_validated(&args.config)?;
    let schedule = bind_if_known(&config, &declared, args.dataset_length)?;

    log(level, LogLevel::Normal, "Configuration is valid");
    if schedule.is_none() && declared.requires_dataset_length() {
        log(
            level,
            LogLevel::Verbose,
            "Epoch-based intervals are unresolved; pass --dataset-length to check them",
        );
    }

    if args.detailed {
        print_detailed_summary(&config, schedule.as_ref());
    }

    Ok(())
}
