//! Stateful progress tracking for a training run
//!
//! This module provides:
//! - `Clock` - the single progress counter advanced once per mini-batch
//! - `ClockState` - immutable snapshots used as trigger references
//! - `EpochProgress` - exact fractional epoch count

mod core;
mod state;


pub use self::core::Clock;
pub use state::{ClockState, EpochProgress};
