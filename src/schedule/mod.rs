//! Per-batch scheduling decisions for a training loop
//!
//! Construction is staged:
//! 1. [`DeclaredSchedule`] records and validates the configured intervals
//!    without touching the dataloader
//! 2. [`DeclaredSchedule::bind`] resolves them against the run's
//!    [`RunContext`](crate::RunContext) and yields a [`Schedule`]
//!
//! # Example
//!
//! ```
//! use reloj::{DeclaredSchedule, RunContext, TimeValue};
//!
//! let declared = DeclaredSchedule {
//!     duration: TimeValue::epochs(2),
//!     evaluation_interval: TimeValue::epochs(1),
//!     ..Default::default()
//! };
//! let mut schedule = declared.bind(RunContext::new(4, Some(100))?)?;
//! let mut evaluations = 0;
//! while !schedule.is_done() {
//!     let tick = schedule.tick();
//!     if tick.evaluate {
//!         evaluations += 1;
//!     }
//! }
//! assert_eq!(evaluations, 2);
//! # Ok::<(), reloj::Error>(())
//! ```

mod declared;
mod lr;


pub use declared::DeclaredSchedule;
pub use lr::{ConstantLR, LRScheduler, LrSchedulerGate, MultiStepLR, StepDecayLR};

use crate::clock::Clock;
use crate::time::TimeValue;
use crate::trigger::{ScheduleTrigger, WarmupTrigger};
use serde::Serialize;

/// What happened on one processed mini-batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tick {
    /// Iterations elapsed after this batch (1-based index of the batch)
    pub iteration: u64,
    /// This batch closed an accumulation window; step the optimizer
    pub step_completed: bool,
    /// An evaluation interval elapsed; run evaluation
    pub evaluate: bool,
    /// An LR update interval elapsed
    pub update_lr: bool,
    /// The batch was processed inside the warmup window
    pub warming_up: bool,
    /// The training duration has elapsed
    pub done: bool,
}

/// A bound clock plus the triggers a training loop polls
#[derive(Debug, Clone)]
pub struct Schedule {
    pub(crate) clock: Clock,
    pub(crate) duration: TimeValue,
    pub(crate) evaluation: ScheduleTrigger,
    pub(crate) lr_update: ScheduleTrigger,
    pub(crate) warmup: WarmupTrigger,
}

impl Schedule {
    /// Process one mini-batch
    ///
    /// Advances the clock (completing a step when the accumulation window is
    /// full), then polls and acknowledges the evaluation and LR-update
    /// triggers. `warming_up` describes the batch just processed.
    pub fn tick(&mut self) -> Tick {
        let warming_up = self.warmup.should_fire(&self.clock);
        let step_completed = self.clock.tick();
        self.warmup.acknowledge(&self.clock);

        let evaluate = self.evaluation.poll(&self.clock);
        let update_lr = self.lr_update.poll(&self.clock);

        Tick {
            iteration: self.clock.state().iterations_elapsed(),
            step_completed,
            evaluate,
            update_lr,
            warming_up,
            done: self.is_done(),
        }
    }

    /// Whether the configured duration has elapsed
    pub fn is_done(&self) -> bool {
        self.clock.elapsed_since(&self.clock.start(), self.duration)
    }

    /// Iterations left until the duration boundary
    pub fn remaining(&self) -> u64 {
        self.clock.remaining(self.duration)
    }

    /// Iteration count of the whole run
    pub fn total_iterations(&self) -> u64 {
        self.clock.resolve(self.duration)
    }

    /// Wrap an LR scheduler so it follows this schedule's warmup
    pub fn lr_gate<S: LRScheduler>(&self, scheduler: S) -> LrSchedulerGate<S> {
        LrSchedulerGate::new(scheduler, self.warmup.warmup())
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn duration(&self) -> TimeValue {
        self.duration
    }

    pub fn evaluation(&self) -> &ScheduleTrigger {
        &self.evaluation
    }

    pub fn lr_update(&self) -> &ScheduleTrigger {
        &self.lr_update
    }

    pub fn warmup(&self) -> &WarmupTrigger {
        &self.warmup
    }
}
