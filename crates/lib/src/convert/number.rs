//! Lenient numeric converters.
//!
//! Documents produced by loosely typed services often carry numbers as
//! strings, or integers as floats. These converters accept either form and
//! round fractional values to the nearest integer.

use serde_json::{Number, Value};

use super::{Converter, Nesting};
use crate::field::Emit;

/// Rounds half away from zero, rejecting values outside `i64`.
fn round_to_i64(value: f64) -> Option<i64> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

fn number_to_i64(number: &Number) -> Option<i64> {
    number
        .as_i64()
        .or_else(|| number.as_u64().and_then(|n| i64::try_from(n).ok()))
        .or_else(|| number.as_f64().and_then(round_to_i64))
}

fn parse_i64(text: &str) -> Option<i64> {
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(round_to_i64))
}

/// Reads an integer from a number or a numeric string; writes a number.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientInt;

impl Converter<i64> for LenientInt {
    fn to_native(&self, value: &Value, _scope: &Nesting<'_>) -> Option<i64> {
        match value {
            Value::Number(number) => number_to_i64(number),
            Value::String(text) => parse_i64(text),
            _ => None,
        }
    }

    fn to_document(&self, native: &i64, _emit: Emit) -> Option<Value> {
        Some(Value::from(*native))
    }
}

/// Like [`LenientInt`], but writes the integer back as a decimal string.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntString;

impl Converter<i64> for IntString {
    fn to_native(&self, value: &Value, scope: &Nesting<'_>) -> Option<i64> {
        LenientInt.to_native(value, scope)
    }

    fn to_document(&self, native: &i64, _emit: Emit) -> Option<Value> {
        Some(Value::String(native.to_string()))
    }
}

/// Reads a float from a number or a numeric string.
///
/// Non-finite values have no JSON form and are omitted on output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientFloat;

impl Converter<f64> for LenientFloat {
    fn to_native(&self, value: &Value, _scope: &Nesting<'_>) -> Option<f64> {
        match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.parse::<f64>().ok(),
            _ => None,
        }
    }

    fn to_document(&self, native: &f64, _emit: Emit) -> Option<Value> {
        Number::from_f64(*native).map(Value::Number)
    }
}
