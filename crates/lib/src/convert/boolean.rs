//! Boolean converters accepting the spellings found in the wild.
//!
//! On input a JSON bool is taken as-is, an integer is true when non-zero,
//! and a string is true when its first character is one of `Y`, `y`, `T`,
//! `t` or `1`. On output the [`BoolStyle`] picks the spelling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Converter, Nesting};
use crate::field::Emit;

const TRUE_LEADS: [char; 5] = ['Y', 'y', 'T', 't', '1'];

/// Output spelling of a boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BoolStyle {
    /// JSON `true` / `false`.
    #[default]
    Boolean,
    /// `"yes"` / `"no"`.
    YesNo,
    /// `"T"` / `"F"`.
    TrueFalse,
    /// `1` / `0`.
    Numeric,
}

impl BoolStyle {
    pub fn render(self, value: bool) -> Value {
        match self {
            BoolStyle::Boolean => Value::Bool(value),
            BoolStyle::YesNo => Value::from(if value { "yes" } else { "no" }),
            BoolStyle::TrueFalse => Value::from(if value { "T" } else { "F" }),
            BoolStyle::Numeric => Value::from(u8::from(value)),
        }
    }
}

/// Reads a boolean from a document value.
///
/// Empty strings and non-boolean kinds yield `None`.
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number
            .as_i64()
            .map(|n| n != 0)
            .or_else(|| number.as_f64().map(|n| n != 0.0)),
        Value::String(text) => text.chars().next().map(|lead| TRUE_LEADS.contains(&lead)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LenientBool(pub BoolStyle);

impl Converter<bool> for LenientBool {
    fn to_native(&self, value: &Value, _scope: &Nesting<'_>) -> Option<bool> {
        parse_bool(value)
    }

    fn to_document(&self, native: &bool, _emit: Emit) -> Option<Value> {
        Some(self.0.render(*native))
    }
}

/// A boolean that distinguishes "not set" from `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tristate {
    #[default]
    NotSet,
    True,
    False,
}

impl Tristate {
    /// The boolean value, or `default` when not set.
    pub fn or(self, default: bool) -> bool {
        match self {
            Tristate::True => true,
            Tristate::False => false,
            Tristate::NotSet => default,
        }
    }

    pub fn is_set(self) -> bool {
        self != Tristate::NotSet
    }

    pub fn is_true(self) -> bool {
        self == Tristate::True
    }

    pub fn is_false(self) -> bool {
        self == Tristate::False
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value { Tristate::True } else { Tristate::False }
    }
}

impl From<Tristate> for Option<bool> {
    fn from(value: Tristate) -> Self {
        match value {
            Tristate::True => Some(true),
            Tristate::False => Some(false),
            Tristate::NotSet => None,
        }
    }
}

/// Converter for [`Tristate`]; `NotSet` is omitted on output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TristateBool(pub BoolStyle);

impl Converter<Tristate> for TristateBool {
    fn to_native(&self, value: &Value, _scope: &Nesting<'_>) -> Option<Tristate> {
        parse_bool(value).map(Tristate::from)
    }

    fn to_document(&self, native: &Tristate, _emit: Emit) -> Option<Value> {
        Option::<bool>::from(*native).map(|flag| self.0.render(flag))
    }
}
