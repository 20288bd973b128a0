//! Unit-tagged time values and their raw input shapes

use super::field::TimeField;
use super::unit::TimeUnit;
use crate::error::{Error, Result};
use crate::resolve::RunContext;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A non-negative whole amount of training progress in one [`TimeUnit`]
///
/// Equality and hashing are structural: `1 epoch` never equals `25 iterations`,
/// even when a run context would make them coincide. Use [`TimeValue::compare`]
/// for cross-unit ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeValue {
    magnitude: u64,
    unit: TimeUnit,
}

impl TimeValue {
    /// Create a time value
    pub const fn new(magnitude: u64, unit: TimeUnit) -> Self {
        Self { magnitude, unit }
    }

    pub const fn iterations(magnitude: u64) -> Self {
        Self::new(magnitude, TimeUnit::Iteration)
    }

    pub const fn steps(magnitude: u64) -> Self {
        Self::new(magnitude, TimeUnit::Step)
    }

    pub const fn epochs(magnitude: u64) -> Self {
        Self::new(magnitude, TimeUnit::Epoch)
    }

    pub fn magnitude(&self) -> u64 {
        self.magnitude
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Zero means "immediately" (e.g. no warmup)
    pub fn is_zero(&self) -> bool {
        self.magnitude == 0
    }

    /// Parse raw input with the unit rules of `field`
    pub fn parse(input: &TimeValueInput, field: &TimeField) -> Result<Self> {
        field.parse(input)
    }

    /// Order two values, resolving both to iterations when their units differ
    ///
    /// Same-unit values compare by magnitude regardless of `context`.
    /// Otherwise both operands go through the resolver; a missing context or
    /// an epoch operand with unknown dataset length yields
    /// [`Error::UnresolvableComparison`].
    pub fn compare(&self, other: &TimeValue, context: Option<&RunContext>) -> Result<Ordering> {
        if self.unit == other.unit {
            return Ok(self.magnitude.cmp(&other.magnitude));
        }

        let unresolvable = || Error::UnresolvableComparison {
            left: self.to_string(),
            right: other.to_string(),
        };
        let context = context.ok_or_else(unresolvable)?;
        let left = context.resolve(*self).map_err(|_| unresolvable())?;
        let right = context.resolve(*other).map_err(|_| unresolvable())?;
        Ok(left.cmp(&right))
    }

    /// Sum of two values in the same unit
    pub fn checked_add(self, other: TimeValue) -> Option<TimeValue> {
        if self.unit != other.unit {
            return None;
        }
        self.magnitude.checked_add(other.magnitude).map(|m| Self::new(m, self.unit))
    }

    /// Difference of two values in the same unit, clamped at zero
    pub fn saturating_sub(self, other: TimeValue) -> Option<TimeValue> {
        if self.unit != other.unit {
            return None;
        }
        Some(Self::new(self.magnitude.saturating_sub(other.magnitude), self.unit))
    }

    /// Scale the magnitude, keeping the unit
    pub fn checked_mul(self, factor: u64) -> Option<TimeValue> {
        self.magnitude.checked_mul(factor).map(|m| Self::new(m, self.unit))
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit.label(self.magnitude))
    }
}

impl FromStr for TimeValue {
    type Err = Error;

    /// Parse with no unit restriction; a bare number means iterations
    fn from_str(s: &str) -> Result<Self> {
        TimeField::ANY.parse_str(s)
    }
}

impl Serialize for TimeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        TimeField::ANY.deserialize(deserializer)
    }
}

/// A number as it appears in configuration text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Integer(i64),
    /// Integers above `i64::MAX`
    Unsigned(u64),
    Float(f64),
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Unsigned(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Every shape a time-valued configuration field may take before parsing
///
/// - bare number: `500`
/// - unit-suffixed string: `"2 epochs"`, `"500it"`, `"3:step"`
/// - structured record: `{ number = 2, unit = "epoch" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValueInput {
    Number(RawNumber),
    Text(String),
    Record { number: RawNumber, unit: String },
}

impl fmt::Display for TimeValueInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Record { number, unit } => write!(f, "{{number: {number}, unit: {unit}}}"),
        }
    }
}

impl From<TimeValue> for TimeValueInput {
    fn from(value: TimeValue) -> Self {
        Self::Record {
            number: match i64::try_from(value.magnitude) {
                Ok(n) => RawNumber::Integer(n),
                Err(_) => RawNumber::Unsigned(value.magnitude),
            },
            unit: value.unit.name().to_string(),
        }
    }
}

impl From<i64> for TimeValueInput {
    fn from(n: i64) -> Self {
        Self::Number(RawNumber::Integer(n))
    }
}

impl From<&str> for TimeValueInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_singular_and_plural() {
        assert_eq!(TimeValue::epochs(1).to_string(), "1 epoch");
        assert_eq!(TimeValue::iterations(0).to_string(), "0 iterations");
        assert_eq!(TimeValue::steps(12).to_string(), "12 steps");
    }

    #[test]
    fn test_equality_is_structural() {
        let ctx = RunContext::new(4, Some(100)).unwrap();
        let epoch = TimeValue::epochs(1);
        let iters = TimeValue::iterations(25);
        assert_ne!(epoch, iters);
        assert_eq!(epoch.compare(&iters, Some(&ctx)).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_compare_same_unit_ignores_context() {
        let a = TimeValue::steps(3);
        let b = TimeValue::steps(7);
        assert_eq!(a.compare(&b, None).unwrap(), Ordering::Less);
        assert_eq!(b.compare(&a, None).unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_compare_cross_unit_without_context_fails() {
        let err = TimeValue::steps(3).compare(&TimeValue::epochs(1), None).unwrap_err();
        assert!(matches!(err, Error::UnresolvableComparison { .. }));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_compare_epoch_with_unknown_length_fails() {
        let ctx = RunContext::new(4, None).unwrap();
        let err = TimeValue::epochs(1)
            .compare(&TimeValue::iterations(10), Some(&ctx))
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvableComparison { .. }));
    }

    #[test]
    fn test_compare_cross_unit_resolves() {
        let ctx = RunContext::new(4, Some(100)).unwrap();
        let ord = TimeValue::epochs(2).compare(&TimeValue::iterations(49), Some(&ctx)).unwrap();
        assert_eq!(ord, Ordering::Greater);
        // steps resolve to their own count; the clock owns step translation
        let ord = TimeValue::steps(10).compare(&TimeValue::iterations(10), Some(&ctx)).unwrap();
        assert_eq!(ord, Ordering::Equal);
    }

    #[test]
    fn test_arithmetic_same_unit_only() {
        let a = TimeValue::epochs(2);
        assert_eq!(a.checked_add(TimeValue::epochs(3)), Some(TimeValue::epochs(5)));
        assert_eq!(a.checked_add(TimeValue::steps(3)), None);
        assert_eq!(a.saturating_sub(TimeValue::epochs(5)), Some(TimeValue::epochs(0)));
        assert_eq!(a.checked_mul(4), Some(TimeValue::epochs(8)));
        assert_eq!(TimeValue::steps(u64::MAX).checked_mul(2), None);
    }

    #[test]
    fn test_serde_string_form() {
        let json = serde_json::to_string(&TimeValue::epochs(2)).unwrap();
        assert_eq!(json, "\"2 epochs\"");
        let back: TimeValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TimeValue::epochs(2));
    }

    #[test]
    fn test_deserialize_all_input_shapes() {
        let bare: TimeValue = serde_json::from_str("7").unwrap();
        assert_eq!(bare, TimeValue::iterations(7));
        let text: TimeValue = serde_json::from_str("\"3 steps\"").unwrap();
        assert_eq!(text, TimeValue::steps(3));
        let record: TimeValue = serde_json::from_str(r#"{"number": 2, "unit": "Epoch"}"#).unwrap();
        assert_eq!(record, TimeValue::epochs(2));
    }

    #[test]
    fn test_input_display_keeps_raw_form() {
        assert_eq!(TimeValueInput::from(-3).to_string(), "-3");
        assert_eq!(TimeValueInput::from("2 weeks").to_string(), "2 weeks");
        assert_eq!(
            TimeValueInput::from(TimeValue::epochs(2)).to_string(),
            "{number: 2, unit: epoch}"
        );
    }
}
