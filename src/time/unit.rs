//! Closed set of units training progress is measured in

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit a [`TimeValue`](super::TimeValue) is expressed in
///
/// - `Iteration` - one processed mini-batch
/// - `Step` - one optimizer update (spans one or more iterations under
///   gradient accumulation)
/// - `Epoch` - one full pass over the training dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[serde(alias = "iterations")]
    Iteration,
    #[serde(alias = "steps")]
    Step,
    #[serde(alias = "epochs")]
    Epoch,
}

impl TimeUnit {
    /// Every unit, finest first
    pub const ALL: [TimeUnit; 3] = [TimeUnit::Iteration, TimeUnit::Step, TimeUnit::Epoch];

    /// Singular lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Self::Iteration => "iteration",
            Self::Step => "step",
            Self::Epoch => "epoch",
        }
    }

    /// Lowercase name agreeing in number with `magnitude`
    pub fn label(self, magnitude: u64) -> &'static str {
        match (self, magnitude == 1) {
            (Self::Iteration, true) => "iteration",
            (Self::Iteration, false) => "iterations",
            (Self::Step, true) => "step",
            (Self::Step, false) => "steps",
            (Self::Epoch, true) => "epoch",
            (Self::Epoch, false) => "epochs",
        }
    }

    /// Look up a unit suffix, case-insensitive and singular/plural tolerant
    ///
    /// Accepted spellings: `it`, `iter`, `iteration` (and plurals), `step`,
    /// `ep`, `epoch` (and plurals).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "it" | "its" | "iter" | "iters" | "iteration" | "iterations" => Some(Self::Iteration),
            "step" | "steps" => Some(Self::Step),
            "ep" | "eps" | "epoch" | "epochs" => Some(Self::Epoch),
            _ => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| format!("unrecognized time unit '{s}'"))
    }
}

/// Comma-separated unit names, e.g. `"step, epoch"`
pub(crate) fn join_units(units: &[TimeUnit]) -> String {
    units.iter().map(|u| u.name()).collect::<Vec<_>>().join(", ")
}
