//! Unit-polymorphic time values
//!
//! Users write intervals in whichever unit is natural (`"2 epochs"`,
//! `500`, `{ number = 1, unit = "step" }`); every shape collapses into one
//! canonical [`TimeValue`].

mod field;
mod unit;
mod value;

#[cfg(test)]
mod proptests;

pub use field::TimeField;
pub(crate) use unit::join_units;
pub use unit::TimeUnit;
pub use value::{RawNumber, TimeValue, TimeValueInput};
