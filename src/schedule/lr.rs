//! Learning-rate scheduler adapter
//!
//! The scheduler implementation itself is external; this module only decides
//! *when* it steps (update trigger fired and warmup over) and scales its rate
//! linearly during warmup.

use super::Tick;
use crate::clock::Clock;
use crate::time::TimeValue;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler
    fn step(&mut self);
}

/// Learning rate that never changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantLR {
    lr: f32,
}

impl ConstantLR {
    pub fn new(lr: f32) -> Self {
        Self { lr }
    }
}

impl LRScheduler for ConstantLR {
    fn get_lr(&self) -> f32 {
        self.lr
    }

    fn step(&mut self) {}
}

impl<S: LRScheduler + ?Sized> LRScheduler for Box<S> {
    fn get_lr(&self) -> f32 {
        (**self).get_lr()
    }

    fn step(&mut self) {
        (**self).step();
    }
}

/// Multiply the rate by `gamma` once every `period` scheduler updates
///
/// With `period == 1` this is an exponential decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDecayLR {
    base: f32,
    gamma: f32,
    period: u64,
    updates: u64,
}

impl StepDecayLR {
    /// `period` of zero never decays
    pub fn new(base: f32, period: u64, gamma: f32) -> Self {
        Self { base, gamma, period, updates: 0 }
    }
}

impl LRScheduler for StepDecayLR {
    fn get_lr(&self) -> f32 {
        let decays = self.updates.checked_div(self.period).unwrap_or(0);
        decay(self.base, self.gamma, decays)
    }

    fn step(&mut self) {
        self.updates = self.updates.saturating_add(1);
    }
}

/// Multiply the rate by `gamma` each time the update count reaches a milestone
#[derive(Debug, Clone, PartialEq)]
pub struct MultiStepLR {
    base: f32,
    gamma: f32,
    milestones: Vec<u64>,
    updates: u64,
}

impl MultiStepLR {
    pub fn new(base: f32, milestones: Vec<u64>, gamma: f32) -> Self {
        Self { base, gamma, milestones, updates: 0 }
    }
}

impl LRScheduler for MultiStepLR {
    fn get_lr(&self) -> f32 {
        let passed = self.milestones.iter().filter(|&&m| m <= self.updates).count();
        decay(self.base, self.gamma, passed as u64)
    }

    fn step(&mut self) {
        self.updates = self.updates.saturating_add(1);
    }
}

fn decay(base: f32, gamma: f32, times: u64) -> f32 {
    base * gamma.powi(i32::try_from(times).unwrap_or(i32::MAX))
}

/// Gates an [`LRScheduler`] on the schedule's update trigger and warmup
pub struct LrSchedulerGate<S: LRScheduler> {
    scheduler: S,
    warmup: TimeValue,
    updates: u64,
}

impl<S: LRScheduler> LrSchedulerGate<S> {
    pub fn new(scheduler: S, warmup: TimeValue) -> Self {
        Self { scheduler, warmup, updates: 0 }
    }

    /// Step the scheduler if this tick's update interval elapsed outside
    /// warmup; returns whether it stepped
    pub fn on_tick(&mut self, tick: &Tick) -> bool {
        if !tick.update_lr || tick.warming_up {
            return false;
        }
        self.scheduler.step();
        self.updates += 1;
        true
    }

    /// Scheduler rate scaled by warmup progress
    pub fn lr(&self, clock: &Clock) -> f32 {
        let scale = clock.fraction_elapsed(&clock.start(), self.warmup);
        self.scheduler.get_lr() * scale as f32
    }

    /// Number of times the wrapped scheduler stepped
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn into_inner(self) -> S {
        self.scheduler
    }
}
