//! Validation runs three passes over the fields in column order (presence,
//! numeric coercion, range) and stops at the first failure. A request missing
//! `rainfall` therefore reports that before an invalid `N`, and an invalid `P`
//! is reported before an out-of-range `N`.
//!
//! Coercion is lenient: JSON numbers and numeric strings (`"90"`, `" 6.5 "`,
//! `"1e2"`, `"1_000"`) are accepted. Everything else (`null`, booleans,
//! arrays, objects, other strings) is an invalid type.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    display::{format_float, format_received},
    features::{Bound, Field, FEATURE_COUNT},
};

/// The seven validated readings in model column order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedVector([f64; FEATURE_COUNT]);

impl ValidatedVector {
    /// Values in column order `[N, P, K, temperature, humidity, ph, rainfall]`
    #[must_use]
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Value of one field
    #[must_use]
    pub fn get(&self, field: Field) -> f64 {
        self.0[field.index()]
    }

    /// Copy into an owned vector for reshaping
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

/// Why a prediction request was rejected
///
/// `Display` is the exact message returned to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required key is absent
    #[error("Missing input value: {field}")]
    MissingField {
        /// First missing field in column order
        field: Field,
    },

    /// A required key holds something that is not a number
    #[error(
        "Invalid data type for {name}. Expected a numeric value, but received: '{received}'",
        name = display_name(.field)
    )]
    InvalidType {
        /// Offending field
        field: Field,
        /// The received value as echoed back
        received: String,
    },

    /// A required key is numeric but outside its inclusive bounds
    #[error(
        "{name} is out of acceptable range. Value must be between {min}{unit} and {max}{unit}. You provided: {shown}{unit}",
        name = display_name(.field),
        unit = unit_suffix(.field),
        shown = render_value(.value)
    )]
    OutOfRange {
        /// Offending field
        field: Field,
        /// The coerced value
        value: f64,
        /// Inclusive lower bound
        min: Bound,
        /// Inclusive upper bound
        max: Bound,
    },
}

impl ValidationError {
    /// Field the error refers to
    #[must_use]
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::InvalidType { field, .. }
            | ValidationError::OutOfRange { field, .. } => *field,
        }
    }
}

fn display_name(field: &Field) -> &'static str {
    field.rule().display_name
}

fn unit_suffix(field: &Field) -> String {
    field.rule().unit_suffix()
}

fn render_value(value: &f64) -> String {
    format_float(*value)
}

/// Validate a request body
///
/// Extra keys are ignored.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found: every field is checked for
/// presence before any is coerced, and every field is coerced before any is
/// range-checked.
pub fn validate(body: &Map<String, Value>) -> Result<ValidatedVector, ValidationError> {
    let mut raw: [&Value; FEATURE_COUNT] = [&Value::Null; FEATURE_COUNT];
    for field in Field::ALL {
        raw[field.index()] = body
            .get(field.key())
            .ok_or(ValidationError::MissingField { field })?;
    }

    let mut values = [0.0_f64; FEATURE_COUNT];
    for field in Field::ALL {
        let value = raw[field.index()];
        values[field.index()] = coerce(value).ok_or_else(|| ValidationError::InvalidType {
            field,
            received: format_received(value),
        })?;
    }

    for field in Field::ALL {
        let rule = field.rule();
        let value = values[field.index()];
        if !rule.contains(value) {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: rule.min,
                max: rule.max,
            });
        }
    }

    Ok(ValidatedVector(values))
}

/// Interpret a raw JSON value as a float
///
/// ```
/// use croprec::validate::coerce;
/// use serde_json::json;
///
/// assert_eq!(coerce(&json!(90)), Some(90.0));
/// assert_eq!(coerce(&json!(" 6.5 ")), Some(6.5));
/// assert_eq!(coerce(&json!("abc")), None);
/// assert_eq!(coerce(&json!(true)), None);
/// ```
#[must_use]
pub fn coerce(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_literal(s),
        _ => None,
    }
}

/// Parse a float literal: surrounding whitespace ignored, single underscores
/// allowed between digits, `inf`/`infinity`/`nan` in any case
fn parse_float_literal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('_') {
        strip_digit_separators(trimmed)?.parse().ok()
    } else {
        trimmed.parse().ok()
    }
}

fn strip_digit_separators(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c == '_' {
            let before = i.checked_sub(1).map(|j| bytes[j]);
            let after = bytes.get(i + 1).copied();
            match (before, after) {
                (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit() => {},
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}
