//! Interval predicates evaluated against a [`Clock`]
//!
//! - `ScheduleTrigger` - periodic "every N units" gate with check/acknowledge
//!   separation, used for evaluation and LR-scheduler updates
//! - `WarmupTrigger` - one-shot window that reports "still warming" until it
//!   has elapsed, then never re-arms

use crate::clock::{Clock, ClockState};
use crate::error::{Error, Result};
use crate::time::TimeValue;

/// Periodic trigger firing at most once per interval
///
/// [`should_fire`](Self::should_fire) only inspects; the training loop calls
/// [`acknowledge`](Self::acknowledge) when it acts on a `true`, which moves the
/// reference point to the current clock state. Polling repeatedly between
/// advances therefore reports the same boundary without consuming it.
///
/// The trigger does not own the clock; every query borrows the clock it was
/// built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTrigger {
    interval: TimeValue,
    last_fired_at: Option<ClockState>,
}

impl ScheduleTrigger {
    /// Create a trigger firing every `interval`
    ///
    /// # Errors
    /// A zero interval would fire on every poll and is rejected.
    pub fn new(interval: TimeValue) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::config_value(
                "interval",
                format!("periodic trigger needs a non-zero interval, got {interval}"),
            ));
        }
        Ok(Self { interval, last_fired_at: None })
    }

    pub fn interval(&self) -> TimeValue {
        self.interval
    }

    /// Clock state at the last acknowledged firing
    pub fn last_fired_at(&self) -> Option<ClockState> {
        self.last_fired_at
    }

    /// Whether a full interval elapsed since the last acknowledged firing
    /// (or since run start)
    pub fn should_fire(&self, clock: &Clock) -> bool {
        let reference = self.last_fired_at.unwrap_or_else(|| clock.start());
        clock.elapsed_since(&reference, self.interval)
    }

    /// Consume the current boundary
    pub fn acknowledge(&mut self, clock: &Clock) {
        self.last_fired_at = Some(clock.state());
    }

    /// Check and, if due, acknowledge in one call
    pub fn poll(&mut self, clock: &Clock) -> bool {
        let fire = self.should_fire(clock);
        if fire {
            self.acknowledge(clock);
        }
        fire
    }
}

/// One-shot warmup window
///
/// `should_fire` is `true` while warming up. Once the warmup has elapsed
/// since run start it reports `false` for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupTrigger {
    warmup: TimeValue,
    completed_at: Option<ClockState>,
}

impl WarmupTrigger {
    /// Create a warmup window; zero means no warmup
    pub fn new(warmup: TimeValue) -> Self {
        Self { warmup, completed_at: None }
    }

    pub fn warmup(&self) -> TimeValue {
        self.warmup
    }

    /// Clock state at which completion was acknowledged
    pub fn completed_at(&self) -> Option<ClockState> {
        self.completed_at
    }

    /// Whether training is still inside the warmup window
    pub fn should_fire(&self, clock: &Clock) -> bool {
        self.completed_at.is_none() && !clock.elapsed_since(&clock.start(), self.warmup)
    }

    /// Latch completion once the window has elapsed; no-op while warming
    pub fn acknowledge(&mut self, clock: &Clock) {
        if self.completed_at.is_none() && clock.elapsed_since(&clock.start(), self.warmup) {
            tracing::debug!(
                iteration = clock.state().iterations_elapsed(),
                warmup = %self.warmup,
                "warmup complete"
            );
            self.completed_at = Some(clock.state());
        }
    }

    pub fn is_complete(&self, clock: &Clock) -> bool {
        !self.should_fire(clock)
    }

    /// Warmup progress in `[0, 1]`
    pub fn progress(&self, clock: &Clock) -> f64 {
        if self.completed_at.is_some() {
            return 1.0;
        }
        clock.fraction_elapsed(&clock.start(), self.warmup)
    }
}
