//! Conversion of time values into iteration counts
//!
//! Epoch → iterations needs the run's batch size and dataset length; the
//! latter may only become known once the dataloader exists (streaming
//! datasets), so epoch resolution fails until it is set.

use crate::error::{Error, Result};
use crate::time::{TimeUnit, TimeValue};
use serde::{Deserialize, Serialize};

/// Batch geometry of one training run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunContext {
    batch_size: u64,
    dataset_length: Option<u64>,
}

impl RunContext {
    /// Create a run context
    ///
    /// # Errors
    /// `batch_size` must be positive, and so must `dataset_length` when known.
    pub fn new(batch_size: u64, dataset_length: Option<u64>) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidRunContext { message: "batch_size must be > 0".into() });
        }
        if dataset_length == Some(0) {
            return Err(Error::InvalidRunContext {
                message: "dataset_length must be > 0".into(),
            });
        }
        Ok(Self { batch_size, dataset_length })
    }

    /// Same context with the dataset length now known
    pub fn with_dataset_length(self, dataset_length: u64) -> Result<Self> {
        Self::new(self.batch_size, Some(dataset_length))
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn dataset_length(&self) -> Option<u64> {
        self.dataset_length
    }

    /// Mini-batches in one epoch, counting a trailing partial batch
    pub fn iterations_per_epoch(&self) -> Option<u64> {
        self.dataset_length.map(|len| len.div_ceil(self.batch_size))
    }

    /// Resolve `value` to an iteration count
    ///
    /// - iterations: unchanged
    /// - steps: unchanged; only the [`Clock`](crate::Clock) knows the current
    ///   accumulation factor and may translate steps to iterations
    /// - epochs: `ceil(magnitude * dataset_length / batch_size)`
    ///
    /// # Errors
    /// [`Error::UnknownDatasetLength`] for an epoch value when the dataset
    /// length is not known yet.
    pub fn resolve(&self, value: TimeValue) -> Result<u64> {
        match value.unit() {
            TimeUnit::Iteration | TimeUnit::Step => Ok(value.magnitude()),
            TimeUnit::Epoch => {
                let len = self
                    .dataset_length
                    .ok_or_else(|| Error::UnknownDatasetLength { value: value.to_string() })?;
                Ok(epochs_to_iterations(value.magnitude(), len, self.batch_size))
            }
        }
    }
}

/// Free-function form of [`RunContext::resolve`]
pub fn resolve(value: TimeValue, context: &RunContext) -> Result<u64> {
    context.resolve(value)
}

/// `ceil(epochs * dataset_length / batch_size)`, saturating at `u64::MAX`
pub(crate) fn epochs_to_iterations(epochs: u64, dataset_length: u64, batch_size: u64) -> u64 {
    let samples = u128::from(epochs) * u128::from(dataset_length);
    let iterations = samples.div_ceil(u128::from(batch_size));
    u64::try_from(iterations).unwrap_or(u64::MAX)
}
