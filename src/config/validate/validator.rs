//! Configuration validation logic

use crate::config::schema::{BaseConfig, Optimizers};
use crate::error::{Error, Result};
use crate::schedule::DeclaredSchedule;
use tracing::warn;

/// Validate a configuration and return its declared schedule
///
/// Checks:
/// - Batch size is positive
/// - Gradient clipping norm, when set, is positive
/// - Learning rate is positive, including per-model overrides
/// - Time-valued fields use allowed units and periodic intervals are non-zero
///
/// Epoch values stay unresolved; see [`DeclaredSchedule::bind`].
pub fn validate_config(config: &BaseConfig) -> Result<DeclaredSchedule> {
    let training = &config.training;

    if training.batch_size == 0 {
        return Err(Error::config_value("batch_size", "must be > 0, got 0"));
    }

    if let Some(norm) = training.gradient_clipping_max_norm {
        if norm.is_nan() || norm <= 0.0 {
            return Err(Error::config_value(
                "gradient_clipping_max_norm",
                format!("must be > 0, got {norm}"),
            ));
        }
    }

    let lr = config.optimizer.learning_rate;
    if lr.is_nan() || lr <= 0.0 {
        return Err(Error::config_value("learning_rate", format!("must be > 0, got {lr}")));
    }
    if config.optimizer.optimizer == Optimizers::Prodigy && lr != 1.0 {
        warn!(learning_rate = lr, "Prodigy adapts its own step size; learning_rate is usually 1.0");
    }

    for (name, model) in &config.models {
        if let Some(lr) = model.learning_rate {
            if lr.is_nan() || lr <= 0.0 {
                return Err(Error::config_value(
                    format!("models.{name}.learning_rate"),
                    format!("must be > 0, got {lr}"),
                ));
            }
        }
    }

    let declared = config.declared_schedule();
    declared.validate()?;
    Ok(declared)
}
