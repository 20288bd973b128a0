//! Unit-aware time accounting for training loops.
//!
//! Training code talks about time in three units that do not convert freely:
//! - **iterations**: mini-batches processed
//! - **steps**: optimizer updates (one per gradient-accumulation window)
//! - **epochs**: passes over the training set, which depend on batch size and
//!   dataset length
//!
//! This crate provides:
//! - [`TimeValue`] parsing with per-field unit rules ([`TimeField`])
//! - Resolution of epochs to iterations against a [`RunContext`]
//! - A [`Clock`] that counts iterations and steps and answers
//!   "has this interval elapsed?"
//! - Periodic and one-shot triggers for evaluation, LR updates and warmup
//! - A staged [`DeclaredSchedule`] → [`Schedule`] builder driven from a
//!   YAML/TOML [`config`]
//!
//! # Example
//!
//! ```
//! use reloj::{Clock, RunContext, TimeValue};
//!
//! let mut clock = Clock::new(RunContext::new(4, Some(100))?)?;
//! let start = clock.state();
//! for _ in 0..25 {
//!     clock.tick();
//! }
//! assert!(clock.elapsed_since(&start, TimeValue::epochs(1)));
//! # Ok::<(), reloj::Error>(())
//! ```

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod resolve;
pub mod schedule;
pub mod time;
pub mod trigger;

pub use clock::{Clock, ClockState, EpochProgress};
pub use config::{load_config, validate_config, BaseConfig};
pub use error::{Error, Result};
pub use resolve::{resolve, RunContext};
pub use schedule::{
    ConstantLR, DeclaredSchedule, LRScheduler, LrSchedulerGate, MultiStepLR, Schedule,
    StepDecayLR, Tick,
};
pub use time::{RawNumber, TimeField, TimeUnit, TimeValue, TimeValueInput};
pub use trigger::{ScheduleTrigger, WarmupTrigger};
