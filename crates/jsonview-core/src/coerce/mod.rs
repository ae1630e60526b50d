//! Json ↔ native scalar coercion.
//!
//! `coerce` maps a json value onto the declared parameter type of a simple
//! setter. `render` maps a native scalar onto its json form. Every unhandled
//! (json kind, target) pair is an error; there is no silent default.

mod format;


use crate::value::{EnumScalar, Scalar, ScalarType, TargetType};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Number, Value as JsonValue};
use std::str::FromStr;
use thiserror::Error as ThisError;

// re-exports
pub use format::FormatContext;

///
/// CoercionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CoercionError {
    #[error("cannot parse '{text}' as {target}")]
    Malformed { text: String, target: TargetType },

    #[error("cannot coerce json {value} to {target}")]
    Unsupported { value: String, target: TargetType },

    #[error("value {value} does not fit {target}")]
    OutOfRange { value: String, target: TargetType },

    #[error("'{text}' is not a value of enumeration {target}")]
    UnknownEnumValue { text: String, target: &'static str },

    #[error("null is not allowed for {target}")]
    NullForRequired { target: TargetType },

    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: TargetType,
        found: ScalarType,
    },

    #[error("cannot coerce string '{text}' to an object")]
    NotAnObject { text: String },

    #[error("expected json {expected}, found json {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{type_tag} has no simple form")]
    NotSimple { type_tag: &'static str },

    #[error("date formatting failed: {0}")]
    Format(String),
}

///
/// COERCE
///

/// Coerce a json value to the target type. `Ok(None)` means "write null".
pub fn coerce(
    value: &JsonValue,
    target: TargetType,
    formats: &FormatContext,
) -> Result<Option<Scalar>, CoercionError> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::Bool(flag) => match target.scalar {
            ScalarType::Bool => Ok(Some(Scalar::Bool(*flag))),
            _ => Err(unsupported(value, target)),
        },
        JsonValue::Number(number) => coerce_number(number, target).map(Some),
        JsonValue::String(text) => coerce_text(text, target, formats),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(unsupported(value, target)),
    }
}

/// Coerce text, with dates parsed through the task's formats.
pub fn coerce_text(
    text: &str,
    target: TargetType,
    formats: &FormatContext,
) -> Result<Option<Scalar>, CoercionError> {
    if target.scalar != ScalarType::Date {
        return parse_plain(text, target);
    }

    if text.is_empty() {
        return Ok(None);
    }

    formats
        .parse(text)
        .map(|date| Some(Scalar::Date(date)))
        .ok_or_else(|| malformed(text, target))
}

/// Parse text for any target that needs no date format.
pub fn parse_plain(text: &str, target: TargetType) -> Result<Option<Scalar>, CoercionError> {
    let scalar = target.scalar;

    // empty string: null when nullable, zero for bare numerics
    if text.is_empty() && !matches!(scalar, ScalarType::Text | ScalarType::Bool) {
        if target.nullable {
            return Ok(None);
        }
        if let Some(zero) = Scalar::zero(scalar) {
            return Ok(Some(zero));
        }
    }

    let parsed = match scalar {
        ScalarType::Bool => Scalar::Bool(text.eq_ignore_ascii_case("true")),
        ScalarType::Byte => Scalar::Byte(parse_number(text, target)?),
        ScalarType::Short => Scalar::Short(parse_number(text, target)?),
        ScalarType::Int => Scalar::Int(parse_number(text, target)?),
        ScalarType::Long => Scalar::Long(parse_number(text, target)?),
        ScalarType::Float => Scalar::Float(parse_number(text, target)?),
        ScalarType::Double => Scalar::Double(parse_number(text, target)?),
        ScalarType::Decimal => {
            Scalar::Decimal(parse_decimal(text).ok_or_else(|| malformed(text, target))?)
        }
        ScalarType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Scalar::Char(ch),
                _ => return Err(malformed(text, target)),
            }
        }
        ScalarType::Text => Scalar::Text(text.to_string()),
        ScalarType::Enum(descriptor) => {
            let index = descriptor.match_text(text).ok_or_else(|| {
                CoercionError::UnknownEnumValue {
                    text: text.to_string(),
                    target: descriptor.type_name,
                }
            })?;

            Scalar::Enum(EnumScalar::new(descriptor, index))
        }
        ScalarType::Date => {
            return Err(CoercionError::Unsupported {
                value: format!("\"{text}\""),
                target,
            });
        }
    };

    Ok(Some(parsed))
}

fn coerce_number(number: &Number, target: TargetType) -> Result<Scalar, CoercionError> {
    let text = number.to_string();
    let out_of_range = || CoercionError::OutOfRange {
        value: text.clone(),
        target,
    };

    match target.scalar {
        ScalarType::Byte => integral(number, target)
            .and_then(|v| i8::try_from(v).map_err(|_| out_of_range()))
            .map(Scalar::Byte),
        ScalarType::Short => integral(number, target)
            .and_then(|v| i16::try_from(v).map_err(|_| out_of_range()))
            .map(Scalar::Short),
        ScalarType::Int => integral(number, target)
            .and_then(|v| i32::try_from(v).map_err(|_| out_of_range()))
            .map(Scalar::Int),
        ScalarType::Long => integral(number, target).map(Scalar::Long),
        ScalarType::Float => float(number, target).map(narrow_float),
        ScalarType::Double => float(number, target).map(Scalar::Double),
        ScalarType::Decimal => parse_decimal(&text)
            .map(Scalar::Decimal)
            .ok_or_else(out_of_range),
        _ => Err(CoercionError::Unsupported {
            value: number.to_string(),
            target,
        }),
    }
}

// Fractions truncate toward zero; anything beyond i64 is out of range.
fn integral(number: &Number, target: TargetType) -> Result<i64, CoercionError> {
    if let Some(value) = number.as_i64() {
        return Ok(value);
    }

    let text = number.to_string();
    parse_decimal(&text)
        .and_then(|value| value.trunc().to_i64())
        .ok_or(CoercionError::OutOfRange { value: text, target })
}

fn float(number: &Number, target: TargetType) -> Result<f64, CoercionError> {
    number
        .as_f64()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CoercionError::OutOfRange {
            value: number.to_string(),
            target,
        })
}

#[expect(clippy::cast_possible_truncation)]
const fn narrow_float(value: f64) -> Scalar {
    Scalar::Float(value as f32)
}

fn parse_number<N: FromStr>(text: &str, target: TargetType) -> Result<N, CoercionError> {
    text.trim().parse().map_err(|_| malformed(text, target))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

///
/// RENDER
///

/// Json form of a simple value.
/// Only int and long become json numbers, decimals become exact json numbers,
/// booleans stay booleans, and everything else is a json string.
pub fn render(
    value: &Scalar,
    show_time: bool,
    formats: &FormatContext,
) -> Result<JsonValue, CoercionError> {
    let json = match value {
        Scalar::Int(v) => JsonValue::from(*v),
        Scalar::Long(v) => JsonValue::from(*v),
        Scalar::Bool(v) => JsonValue::Bool(*v),
        Scalar::Decimal(v) => Number::from_str(&v.to_string())
            .map(JsonValue::Number)
            .map_err(|err| CoercionError::Format(err.to_string()))?,
        other => JsonValue::String(render_text(other, show_time, formats)?),
    };

    Ok(json)
}

/// Text form of a simple value, as used for list elements and map keys.
pub fn render_text(
    value: &Scalar,
    show_time: bool,
    formats: &FormatContext,
) -> Result<String, CoercionError> {
    match value {
        Scalar::Date(date) => formats.format(*date, show_time),
        Scalar::Enum(value) => Ok(value.external().to_string()),
        Scalar::Text(text) => Ok(text.clone()),
        other => Ok(other.to_string()),
    }
}

/// Name of a json value's kind, for diagnostics.
#[must_use]
pub const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn malformed(text: &str, target: TargetType) -> CoercionError {
    CoercionError::Malformed {
        text: text.to_string(),
        target,
    }
}

fn unsupported(value: &JsonValue, target: TargetType) -> CoercionError {
    CoercionError::Unsupported {
        value: value.to_string(),
        target,
    }
}
