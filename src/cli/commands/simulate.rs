//! Simulate command implementation
//!
//! Replays a run without any model: one [`Schedule::tick`] per batch, with the
//! configured LR scheduler behind the warmup gate.

use super::load_validated;
use crate::cli::logging::log;
use crate::cli::{LogLevel, SimulateArgs};
use crate::clock::Clock;
use crate::schedule::{LRScheduler, Schedule, Tick};
use serde::Serialize;

/// Counts collected while replaying a schedule
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SimulationSummary {
    pub iterations: u64,
    pub steps: u64,
    pub evaluations: u64,
    pub lr_updates: u64,
    pub warmup_iterations: u64,
    pub done: bool,
    pub final_lr: f32,
    /// One line per batch on which something happened
    #[serde(skip)]
    pub events: Vec<String>,
}

fn format_event(tick: &Tick, clock: &Clock, stepped_lr: bool, lr: f32) -> String {
    let mut labels = Vec::new();
    if tick.step_completed {
        labels.push("optimizer step".to_string());
    }
    if tick.evaluate {
        labels.push("evaluate".to_string());
    }
    if stepped_lr {
        labels.push(format!("lr update (lr={lr:.6})"));
    }
    if tick.done {
        labels.push("done".to_string());
    }
    let state = clock.state();
    format!(
        "iter {:>8}  epoch {}  step {:>6}  {}",
        tick.iteration,
        state.epochs_elapsed(),
        state.steps_elapsed(),
        labels.join(", ")
    )
}

/// Tick `schedule` until done or `max_iterations` batches were processed
pub fn replay<S: LRScheduler>(
    schedule: &mut Schedule,
    scheduler: S,
    max_iterations: Option<u64>,
) -> SimulationSummary {
    let mut gate = schedule.lr_gate(scheduler);
    let limit = max_iterations.unwrap_or(u64::MAX);
    let mut summary = SimulationSummary::default();

    while !schedule.is_done() && summary.iterations < limit {
        let tick = schedule.tick();
        let stepped_lr = gate.on_tick(&tick);

        summary.iterations = tick.iteration;
        summary.steps += u64::from(tick.step_completed);
        summary.evaluations += u64::from(tick.evaluate);
        summary.lr_updates += u64::from(stepped_lr);
        summary.warmup_iterations += u64::from(tick.warming_up);

        if tick.step_completed || tick.evaluate || stepped_lr || tick.done {
            let lr = gate.lr(schedule.clock());
            summary.events.push(format_event(&tick, schedule.clock(), stepped_lr, lr));
        }
    }

    summary.done = schedule.is_done();
    summary.final_lr = gate.lr(schedule.clock());
    summary
}

pub fn run_simulate(args: SimulateArgs, level: LogLevel) -> Result<(), String> {
    let (config, declared) = load_validated(&args.config)?;
    let context = config
        .run_context(Some(args.dataset_length))
        .map_err(|e| format!("Simulation failed [{}]: {e}", e.code()))?;
    let mut schedule =
        declared.bind(context).map_err(|e| format!("Simulation failed [{}]: {e}", e.code()))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Simulating {} iterations ({} per epoch, {} per step)",
            schedule.total_iterations(),
            schedule.clock().iterations_per_epoch(),
            schedule.clock().iterations_per_step()
        ),
    );

    let scheduler = config.lr_scheduler.build_scheduler(config.optimizer.learning_rate as f32);
    let summary = replay(&mut schedule, scheduler, args.max_iterations);
    for line in &summary.events {
        log(level, LogLevel::Normal, line);
    }

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Processed {} iterations: {} steps, {} evaluations, {} LR updates{}",
            summary.iterations,
            summary.steps,
            summary.evaluations,
            summary.lr_updates,
            if summary.done { "" } else { " (stopped before done)" }
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Warmup iterations: {}, final lr: {}, wall time: {:?}",
            summary.warmup_iterations,
            summary.final_lr,
            schedule.clock().wall_elapsed()
        ),
    );

    Ok(())
}
