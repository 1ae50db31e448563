//! Enums stored in documents as string labels.

use std::marker::PhantomData;

use serde_json::Value;

use super::{Converter, Nesting};
use crate::field::Emit;

/// An enum with a fixed label table.
///
/// ```
/// use docview::convert::StringEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Status { Active, Closed }
///
/// impl StringEnum for Status {
///     fn table() -> &'static [(&'static str, Self)] {
///         &[("active", Status::Active), ("closed", Status::Closed)]
///     }
/// }
///
/// assert_eq!(Status::from_label("closed"), Some(Status::Closed));
/// assert_eq!(Status::Active.label(), Some("active"));
/// ```
pub trait StringEnum: Copy + PartialEq + Send + Sync + 'static {
    /// Label/variant pairs. A variant listed twice is written with its
    /// first label.
    fn table() -> &'static [(&'static str, Self)];

    fn from_label(label: &str) -> Option<Self> {
        Self::table()
            .iter()
            .find(|(candidate, _)| *candidate == label)
            .map(|(_, variant)| *variant)
    }

    fn label(self) -> Option<&'static str> {
        Self::table()
            .iter()
            .find(|(_, variant)| *variant == self)
            .map(|(label, _)| *label)
    }
}

/// Converter for any [`StringEnum`]. Unknown labels read as absent and
/// variants without a label are omitted.
pub struct EnumConverter<E>(PhantomData<fn() -> E>);

impl<E> EnumConverter<E> {
    pub fn new() -> Self {
        EnumConverter(PhantomData)
    }
}

impl<E> Default for EnumConverter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: StringEnum> Converter<E> for EnumConverter<E> {
    fn to_native(&self, value: &Value, _scope: &Nesting<'_>) -> Option<E> {
        let label = value.as_str()?;
        let found = E::from_label(label);
        if found.is_none() {
            tracing::debug!(label, "unknown enum label");
        }
        found
    }

    fn to_document(&self, native: &E, _emit: Emit) -> Option<Value> {
        native.label().map(Value::from)
    }
}
