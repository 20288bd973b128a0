//! The training clock

use super::state::ClockState;
use crate::error::{Error, Result};
use crate::resolve::{epochs_to_iterations, RunContext};
use crate::time::{TimeUnit, TimeValue};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Single authoritative progress counter for a training run
///
/// The training loop calls [`Clock::advance`] (or [`Clock::tick`]) exactly
/// once per processed mini-batch; nothing else mutates the clock. Boundary
/// queries are exact to the iteration whatever unit they are written in.
///
/// # Example
///
/// ```
/// use reloj::{Clock, RunContext, TimeValue};
///
/// let ctx = RunContext::new(4, Some(100))?;
/// let mut clock = Clock::new(ctx)?;
/// let start = clock.state();
/// for _ in 0..24 {
///     clock.tick();
/// }
/// assert!(!clock.elapsed_since(&start, TimeValue::epochs(1)));
/// clock.tick();
/// assert!(clock.elapsed_since(&start, TimeValue::epochs(1)));
/// # Ok::<(), reloj::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    context: RunContext,
    dataset_length: u64,
    iterations_per_epoch: u64,
    iterations_per_step: u64,
    start: ClockState,
    state: ClockState,
    /// Iteration count when the current accumulation window opened
    window_start: u64,
    verbose: bool,
    started_at: Instant,
}

impl Clock {
    /// Clock with one iteration per optimizer step
    ///
    /// # Errors
    /// [`Error::UnknownDatasetLength`] when `context` has no dataset length.
    pub fn new(context: RunContext) -> Result<Self> {
        Self::with_accumulation(context, TimeValue::steps(1))
    }

    /// Clock whose optimizer steps each span `accumulation`
    ///
    /// `N steps` means N iterations per step, `N epochs` the iteration count
    /// of N epochs.
    ///
    /// # Errors
    /// [`Error::UnknownDatasetLength`] when `context` has no dataset length,
    /// [`Error::ConfigValue`] when `accumulation` spans zero iterations.
    pub fn with_accumulation(context: RunContext, accumulation: TimeValue) -> Result<Self> {
        let dataset_length = context.dataset_length().ok_or_else(|| {
            Error::UnknownDatasetLength { value: TimeValue::epochs(1).to_string() }
        })?;
        let iterations_per_epoch = epochs_to_iterations(1, dataset_length, context.batch_size());

        let iterations_per_step = match accumulation.unit() {
            TimeUnit::Iteration | TimeUnit::Step => accumulation.magnitude(),
            TimeUnit::Epoch => {
                epochs_to_iterations(accumulation.magnitude(), dataset_length, context.batch_size())
            }
        };
        if iterations_per_step == 0 {
            return Err(Error::config_value(
                "gradient_accumulation",
                format!("{accumulation} spans zero iterations; use at least 1 step"),
            ));
        }

        let start = ClockState::start(context.batch_size(), dataset_length);
        debug!(
            batch_size = context.batch_size(),
            dataset_length,
            iterations_per_epoch,
            iterations_per_step,
            "clock initialized"
        );

        Ok(Self {
            context,
            dataset_length,
            iterations_per_epoch,
            iterations_per_step,
            start,
            state: start,
            window_start: 0,
            verbose: false,
            started_at: Instant::now(),
        })
    }

    /// Log an `info` line on every step and epoch boundary
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Record one processed mini-batch
    ///
    /// `completed_step` is true when this iteration closed a
    /// gradient-accumulation window and the optimizer stepped.
    pub fn advance(&mut self, completed_step: bool) {
        self.state.record_iteration(completed_step);
        let iteration = self.state.iterations_elapsed();

        if completed_step {
            self.window_start = iteration;
            if self.verbose {
                info!(iteration, step = self.state.steps_elapsed(), "step completed");
            } else {
                debug!(iteration, step = self.state.steps_elapsed(), "step completed");
            }
        }

        let epochs = self.state.epochs_elapsed();
        if epochs.is_boundary() {
            if self.verbose {
                info!(iteration, epoch = epochs.completed(), "epoch completed");
            } else {
                debug!(iteration, epoch = epochs.completed(), "epoch completed");
            }
        }
    }

    /// Advance by one mini-batch, completing a step when the accumulation
    /// window is full; returns whether a step completed
    pub fn tick(&mut self) -> bool {
        let in_window = self.state.iterations_elapsed().saturating_add(1) - self.window_start;
        let completed_step = in_window >= self.iterations_per_step;
        self.advance(completed_step);
        completed_step
    }

    /// Whether at least `interval` of progress happened since `reference`
    ///
    /// Iterations and steps compare exact counts; epochs compare iteration
    /// counts against the resolved epoch threshold, so there is no
    /// fractional drift.
    pub fn elapsed_since(&self, reference: &ClockState, interval: TimeValue) -> bool {
        self.progress_since(reference, interval) >= self.threshold(interval)
    }

    /// Share of `interval` elapsed since `reference`, in `[0, 1]`
    pub fn fraction_elapsed(&self, reference: &ClockState, interval: TimeValue) -> f64 {
        let threshold = self.threshold(interval);
        if threshold == 0 {
            return 1.0;
        }
        let progress = self.progress_since(reference, interval).min(threshold);
        progress as f64 / threshold as f64
    }

    /// Iteration count equivalent to `value` under the current accumulation
    pub fn resolve(&self, value: TimeValue) -> u64 {
        match value.unit() {
            TimeUnit::Iteration => value.magnitude(),
            TimeUnit::Step => value.magnitude().saturating_mul(self.iterations_per_step),
            TimeUnit::Epoch => self.epoch_threshold(value.magnitude()),
        }
    }

    /// Iterations left until `duration` has elapsed since the run started
    pub fn remaining(&self, duration: TimeValue) -> u64 {
        match duration.unit() {
            TimeUnit::Step => {
                let steps_left = duration.magnitude().saturating_sub(self.state.steps_elapsed());
                let in_window = self.state.iterations_elapsed() - self.window_start;
                steps_left
                    .saturating_mul(self.iterations_per_step)
                    .saturating_sub(in_window)
            }
            TimeUnit::Iteration | TimeUnit::Epoch => {
                self.resolve(duration).saturating_sub(self.state.iterations_elapsed())
            }
        }
    }

    /// Current progress snapshot
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Snapshot taken at run start
    pub fn start(&self) -> ClockState {
        self.start
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn dataset_length(&self) -> u64 {
        self.dataset_length
    }

    /// Iterations in the first epoch, `ceil(dataset_length / batch_size)`
    ///
    /// When the batch size does not divide the dataset, later epochs may be
    /// one iteration shorter; epoch `k` always ends at
    /// `ceil(k * dataset_length / batch_size)`.
    pub fn iterations_per_epoch(&self) -> u64 {
        self.iterations_per_epoch
    }

    pub fn iterations_per_step(&self) -> u64 {
        self.iterations_per_step
    }

    /// Zero-based index of the epoch the next iteration belongs to
    pub fn epoch_index(&self) -> u64 {
        self.state.epochs_elapsed().completed()
    }

    /// True right after the last iteration of an epoch
    pub fn is_epoch_boundary(&self) -> bool {
        self.state.epochs_elapsed().is_boundary()
    }

    /// Wall time since the clock was constructed
    pub fn wall_elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn progress_since(&self, reference: &ClockState, interval: TimeValue) -> u64 {
        match interval.unit() {
            TimeUnit::Step => self.state.steps_elapsed().saturating_sub(reference.steps_elapsed()),
            TimeUnit::Iteration | TimeUnit::Epoch => self
                .state
                .iterations_elapsed()
                .saturating_sub(reference.iterations_elapsed()),
        }
    }

    fn threshold(&self, interval: TimeValue) -> u64 {
        match interval.unit() {
            TimeUnit::Iteration | TimeUnit::Step => interval.magnitude(),
            TimeUnit::Epoch => self.epoch_threshold(interval.magnitude()),
        }
    }

    fn epoch_threshold(&self, epochs: u64) -> u64 {
        epochs_to_iterations(epochs, self.dataset_length, self.context.batch_size())
    }
}
