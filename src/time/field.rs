//! Per-field parsing rules for time-valued configuration
//!
//! A bare integer means different things for different fields (`duration: 500`
//! is iterations, `gradient_accumulation: 4` is steps), and some fields only
//! make sense in some units. Each field carries its own [`TimeField`]
//! descriptor instead of relying on a global default.

use super::unit::{join_units, TimeUnit};
use super::value::{RawNumber, TimeValue, TimeValueInput};
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};

/// Largest float whose integer neighbours are all representable (2^53)
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Parsing rules for one time-valued field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeField {
    /// Field name reported in errors
    pub name: &'static str,
    /// Units the field accepts
    pub allowed: &'static [TimeUnit],
    /// Unit given to unit-less numbers
    pub default_unit: TimeUnit,
}

impl TimeField {
    /// Any unit, bare numbers are iterations
    pub const ANY: TimeField = TimeField::new("time value", &TimeUnit::ALL, TimeUnit::Iteration);

    /// Total training length
    pub const DURATION: TimeField = TimeField::new("duration", &TimeUnit::ALL, TimeUnit::Iteration);

    /// Size of one gradient-accumulation window
    pub const GRADIENT_ACCUMULATION: TimeField = TimeField::new(
        "gradient_accumulation",
        &[TimeUnit::Step, TimeUnit::Epoch],
        TimeUnit::Step,
    );

    /// Distance between evaluation runs
    pub const EVALUATION_INTERVAL: TimeField = TimeField::new(
        "evaluation_interval",
        &[TimeUnit::Step, TimeUnit::Epoch],
        TimeUnit::Step,
    );

    /// Distance between learning-rate scheduler updates
    pub const UPDATE_INTERVAL: TimeField = TimeField::new(
        "update_interval",
        &[TimeUnit::Iteration, TimeUnit::Epoch],
        TimeUnit::Iteration,
    );

    /// Learning-rate warmup window
    pub const WARMUP: TimeField = TimeField::new("warmup", &TimeUnit::ALL, TimeUnit::Iteration);

    /// Create a descriptor; `default_unit` should be one of `allowed`
    pub const fn new(name: &'static str, allowed: &'static [TimeUnit], default_unit: TimeUnit) -> Self {
        Self { name, allowed, default_unit }
    }

    /// Whether the field accepts `unit`
    pub fn allows(&self, unit: TimeUnit) -> bool {
        self.allowed.contains(&unit)
    }

    /// Parse any raw input shape into a canonical [`TimeValue`]
    pub fn parse(&self, input: &TimeValueInput) -> Result<TimeValue> {
        let raw = input.to_string();
        let value = match input {
            TimeValueInput::Number(number) => {
                TimeValue::new(self.magnitude(*number, &raw)?, self.default_unit)
            }
            TimeValueInput::Text(text) => return self.parse_str(text),
            TimeValueInput::Record { number, unit } => {
                let unit = self.unit(unit, &raw)?;
                TimeValue::new(self.magnitude(*number, &raw)?, unit)
            }
        };
        self.check_unit(value, &raw)
    }

    /// Parse `<int>`, `<int><unit>`, `<int> <unit>` or `<int>:<unit>`
    pub fn parse_str(&self, text: &str) -> Result<TimeValue> {
        let trimmed = text.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | '_')))
            .unwrap_or(trimmed.len());
        let (number, suffix) = trimmed.split_at(split);
        let suffix = suffix.trim_start();
        let suffix = suffix.strip_prefix(':').unwrap_or(suffix).trim();

        if number.is_empty() {
            return Err(self.invalid(text, "missing number"));
        }
        let number = number.replace('_', "");
        let number = if let Ok(n) = number.parse::<i64>() {
            RawNumber::Integer(n)
        } else if let Ok(n) = number.parse::<u64>() {
            RawNumber::Unsigned(n)
        } else if let Ok(x) = number.parse::<f64>() {
            RawNumber::Float(x)
        } else {
            return Err(self.invalid(text, "number is not a valid integer"));
        };

        let unit = if suffix.is_empty() { self.default_unit } else { self.unit(suffix, text)? };
        let value = TimeValue::new(self.magnitude(number, text)?, unit);
        self.check_unit(value, text)
    }

    /// `deserialize_with` entry point for this field
    ///
    /// The input is buffered first so that an unrecognized shape (a boolean,
    /// a list, a record with the wrong keys) is still reported verbatim.
    pub fn deserialize<'de, D>(&self, deserializer: D) -> std::result::Result<TimeValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        let buffered = serde_yaml::Value::deserialize(deserializer)?;
        let input = TimeValueInput::deserialize(buffered.clone()).map_err(|_| {
            serde::de::Error::custom(self.invalid(&render_raw(&buffered), "unrecognized shape"))
        })?;
        self.parse(&input).map_err(serde::de::Error::custom)
    }

    fn magnitude(&self, number: RawNumber, raw: &str) -> Result<u64> {
        match number {
            RawNumber::Integer(n) if n < 0 => Err(self.invalid(raw, "value is negative")),
            RawNumber::Integer(n) => Ok(n.unsigned_abs()),
            RawNumber::Unsigned(n) => Ok(n),
            RawNumber::Float(x) if !x.is_finite() => Err(self.invalid(raw, "value is not finite")),
            RawNumber::Float(x) if x < 0.0 => Err(self.invalid(raw, "value is negative")),
            RawNumber::Float(x) if x.fract() != 0.0 => {
                Err(self.invalid(raw, "value is not a whole number"))
            }
            RawNumber::Float(x) if x > MAX_EXACT_FLOAT => {
                Err(self.invalid(raw, "value is too large for a float; write it as an integer"))
            }
            RawNumber::Float(x) => Ok(x as u64),
        }
    }

    fn unit(&self, token: &str, raw: &str) -> Result<TimeUnit> {
        TimeUnit::from_token(token)
            .ok_or_else(|| self.invalid(raw, &format!("unrecognized unit '{}'", token.trim())))
    }

    fn check_unit(&self, value: TimeValue, raw: &str) -> Result<TimeValue> {
        if self.allows(value.unit()) {
            Ok(value)
        } else {
            Err(self.invalid(raw, &format!("unit {} is not allowed here", value.unit())))
        }
    }

    fn invalid(&self, raw: &str, reason: &str) -> Error {
        Error::InvalidTimeValue {
            field: self.name.to_string(),
            raw: raw.to_string(),
            reason: reason.to_string(),
            allowed: join_units(self.allowed),
        }
    }
}

/// Compact single-line rendering of a buffered input for error messages
fn render_raw(value: &serde_yaml::Value) -> String {
    serde_json::to_string(value)
        .or_else(|_| serde_yaml::to_string(value).map(|s| s.trim().to_string()))
        .unwrap_or_else(|_| format!("{value:?}"))
}
