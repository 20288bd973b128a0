//! First construction phase: validated but unresolved intervals

use super::Schedule;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::resolve::RunContext;
use crate::time::{TimeField, TimeUnit, TimeValue};
use crate::trigger::{ScheduleTrigger, WarmupTrigger};
use serde::Serialize;
use tracing::{debug, warn};

/// Intervals a run declares, before the dataloader is known
///
/// Units have been checked against each field's rules, but epoch values are
/// not resolved yet. [`bind`](Self::bind) turns this into a running
/// [`Schedule`] once batch size and dataset length are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeclaredSchedule {
    pub duration: TimeValue,
    pub gradient_accumulation: TimeValue,
    pub evaluation_interval: TimeValue,
    pub update_interval: TimeValue,
    pub warmup: TimeValue,
    pub verbose: bool,
}

impl Default for DeclaredSchedule {
    fn default() -> Self {
        Self {
            duration: TimeValue::iterations(1),
            gradient_accumulation: TimeValue::steps(1),
            evaluation_interval: TimeValue::steps(1),
            update_interval: TimeValue::iterations(1),
            warmup: TimeValue::iterations(0),
            verbose: false,
        }
    }
}

impl DeclaredSchedule {
    /// Check every declared interval against its field rules
    ///
    /// Periodic intervals (accumulation, evaluation, LR update) must be
    /// non-zero; duration and warmup may be zero.
    pub fn validate(&self) -> Result<()> {
        check_unit(&TimeField::DURATION, self.duration)?;
        check_unit(&TimeField::WARMUP, self.warmup)?;
        for (field, value) in self.periodic() {
            check_unit(&field, value)?;
            if value.is_zero() {
                return Err(Error::config_value(
                    field.name,
                    format!("must be at least 1 {}, got {value}", value.unit()),
                ));
            }
        }
        if self.warmup.unit() == self.duration.unit()
            && !self.duration.is_zero()
            && self.warmup.magnitude() >= self.duration.magnitude()
        {
            warn!(warmup = %self.warmup, duration = %self.duration, "warmup covers the whole run");
        }
        Ok(())
    }

    /// Whether binding needs a known dataset length
    pub fn requires_dataset_length(&self) -> bool {
        self.fields().iter().any(|(_, v)| v.unit() == TimeUnit::Epoch)
    }

    /// Resolve against the run's batch geometry and start the clock
    ///
    /// # Errors
    /// [`Error::UnknownDatasetLength`] naming the first epoch-valued field when
    /// the dataset length is unknown; the clock itself always needs it, so a
    /// context without one fails here rather than at first use.
    pub fn bind(&self, context: RunContext) -> Result<Schedule> {
        self.validate()?;

        if context.dataset_length().is_none() {
            let offending = self
                .fields()
                .into_iter()
                .find(|(_, v)| v.unit() == TimeUnit::Epoch)
                .map(|(name, v)| format!("{name} = {v}"))
                .unwrap_or_else(|| TimeValue::epochs(1).to_string());
            return Err(Error::UnknownDatasetLength { value: offending });
        }

        let clock = Clock::with_accumulation(context, self.gradient_accumulation)?
            .with_verbose(self.verbose);

        let warmup_iterations = clock.resolve(self.warmup);
        let duration_iterations = clock.resolve(self.duration);
        if warmup_iterations > 0 && warmup_iterations >= duration_iterations {
            warn!(
                warmup_iterations,
                duration_iterations, "warmup is not shorter than the training duration"
            );
        }
        debug!(
            duration_iterations,
            iterations_per_epoch = clock.iterations_per_epoch(),
            iterations_per_step = clock.iterations_per_step(),
            "schedule bound"
        );

        Ok(Schedule {
            clock,
            duration: self.duration,
            evaluation: ScheduleTrigger::new(self.evaluation_interval)?,
            lr_update: ScheduleTrigger::new(self.update_interval)?,
            warmup: WarmupTrigger::new(self.warmup),
        })
    }

    fn periodic(&self) -> [(TimeField, TimeValue); 3] {
        [
            (TimeField::GRADIENT_ACCUMULATION, self.gradient_accumulation),
            (TimeField::EVALUATION_INTERVAL, self.evaluation_interval),
            (TimeField::UPDATE_INTERVAL, self.update_interval),
        ]
    }

    fn fields(&self) -> [(&'static str, TimeValue); 5] {
        [
            ("duration", self.duration),
            ("gradient_accumulation", self.gradient_accumulation),
            ("evaluation_interval", self.evaluation_interval),
            ("update_interval", self.update_interval),
            ("warmup", self.warmup),
        ]
    }
}

fn check_unit(field: &TimeField, value: TimeValue) -> Result<()> {
    if field.allows(value.unit()) {
        return Ok(());
    }
    Err(Error::InvalidTimeValue {
        field: field.name.to_string(),
        raw: value.to_string(),
        reason: format!("unit {} is not allowed here", value.unit()),
        allowed: crate::time::join_units(field.allowed),
    })
}
