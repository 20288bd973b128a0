//! Read-only snapshots of training progress

use crate::resolve::epochs_to_iterations;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Progress counters at one point of a run
///
/// Only [`Clock`](super::Clock) creates or advances these; everyone else
/// holds them as immutable snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClockState {
    iterations_elapsed: u64,
    steps_elapsed: u64,
    batch_size: u64,
    dataset_length: u64,
}

impl ClockState {
    pub(crate) fn start(batch_size: u64, dataset_length: u64) -> Self {
        Self { iterations_elapsed: 0, steps_elapsed: 0, batch_size, dataset_length }
    }

    pub(crate) fn record_iteration(&mut self, completed_step: bool) {
        self.iterations_elapsed = self.iterations_elapsed.saturating_add(1);
        if completed_step {
            self.steps_elapsed = self.steps_elapsed.saturating_add(1);
        }
    }

    pub fn iterations_elapsed(&self) -> u64 {
        self.iterations_elapsed
    }

    pub fn steps_elapsed(&self) -> u64 {
        self.steps_elapsed
    }

    /// Epochs elapsed as an exact fraction of samples seen
    pub fn epochs_elapsed(&self) -> EpochProgress {
        EpochProgress {
            iterations: self.iterations_elapsed,
            batch_size: self.batch_size,
            dataset_length: self.dataset_length,
        }
    }
}

/// `iterations * batch_size / dataset_length`, kept as a fraction
///
/// Epoch `k` ends at iteration `ceil(k * dataset_length / batch_size)`, the
/// same threshold an `"k epochs"` interval resolves to, so a trailing partial
/// batch never makes the two disagree.
#[derive(Debug, Clone, Copy, Eq, Serialize)]
pub struct EpochProgress {
    iterations: u64,
    batch_size: u64,
    dataset_length: u64,
}

impl EpochProgress {
    /// Samples seen
    pub fn numerator(&self) -> u128 {
        u128::from(self.iterations) * u128::from(self.batch_size)
    }

    /// Samples per epoch
    pub fn denominator(&self) -> u64 {
        self.dataset_length
    }

    /// Whole epochs finished
    pub fn completed(&self) -> u64 {
        let completed = self.numerator() / u128::from(self.dataset_length);
        u64::try_from(completed).unwrap_or(u64::MAX)
    }

    /// Iterations since the last completed epoch ended
    pub fn remainder(&self) -> u64 {
        self.iterations - self.epoch_end(self.completed())
    }

    /// True right after the last iteration of an epoch
    pub fn is_boundary(&self) -> bool {
        self.iterations > 0 && self.remainder() == 0
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator() as f64 / self.dataset_length as f64
    }

    fn epoch_end(&self, epochs: u64) -> u64 {
        epochs_to_iterations(epochs, self.dataset_length, self.batch_size)
    }
}

/// Compare `a / b` with `c / d` exactly, without overflowing products
fn cmp_fractions(a: u128, b: u128, c: u128, d: u128) -> Ordering {
    let (qa, ra) = (a / b, a % b);
    let (qc, rc) = (c / d, c % d);
    match qa.cmp(&qc) {
        Ordering::Equal => match (ra, rc) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Less,
            (_, 0) => Ordering::Greater,
            // ra/b vs rc/d is the reverse of b/ra vs d/rc
            _ => cmp_fractions(d, rc, b, ra),
        },
        other => other,
    }
}

impl PartialEq for EpochProgress {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for EpochProgress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EpochProgress {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_fractions(
            self.numerator(),
            u128::from(self.dataset_length),
            other.numerator(),
            u128::from(other.dataset_length),
        )
    }
}

impl fmt::Display for EpochProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(iterations: u64, batch_size: u64, dataset_length: u64) -> EpochProgress {
        EpochProgress { iterations, batch_size, dataset_length }
    }

    #[test]
    fn test_record_iteration() {
        let mut state = ClockState::start(4, 100);
        state.record_iteration(false);
        state.record_iteration(true);
        assert_eq!(state.iterations_elapsed(), 2);
        assert_eq!(state.steps_elapsed(), 1);
        assert_eq!(state.epochs_elapsed().numerator(), 8);
        assert_eq!(state.epochs_elapsed().denominator(), 100);
    }

    #[test]
    fn test_epoch_progress_parts() {
        let p = progress(53, 4, 100);
        assert_eq!(p.completed(), 2);
        assert_eq!(p.remainder(), 3);
        assert!(!p.is_boundary());
        assert!(progress(50, 4, 100).is_boundary());
        assert!(!progress(0, 4, 100).is_boundary());
        assert_eq!(progress(50, 4, 100).to_string(), "2.00");
    }

    #[test]
    fn test_uneven_epochs_end_at_resolved_thresholds() {
        // 10 samples at batch size 4: epochs end at iterations 3, 5, 8, 10
        let boundaries: Vec<u64> =
            (1..=10).filter(|&i| progress(i, 4, 10).is_boundary()).collect();
        assert_eq!(boundaries, vec![3, 5, 8, 10]);
        assert_eq!(progress(4, 4, 10).completed(), 1);
        assert_eq!(progress(4, 4, 10).remainder(), 1);
        assert_eq!(progress(5, 4, 10).completed(), 2);
        assert_eq!(progress(7, 4, 10).remainder(), 2);
    }

    #[test]
    fn test_epoch_progress_compares_as_fraction() {
        assert_eq!(progress(1, 5, 10), progress(5, 1, 10));
        assert_eq!(progress(2, 3, 4), progress(3, 2, 4));
        assert!(progress(1, 1, 3) < progress(1, 1, 2));
        assert!(progress(26, 1, 25) > progress(1, 1, 1));
        assert!(progress(2, 1, 3) > progress(3, 1, 5));
        assert!(progress(u64::MAX, u64::MAX, 3) > progress(u64::MAX, u64::MAX, 4));
    }
}
