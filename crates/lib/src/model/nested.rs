//! Converters whose native type is itself a model.
//!
//! Sub-models are built through [`Nesting::adopt`], so they inherit the
//! parent's mutability and share its guard. Writing them back recursively
//! materializes each child with the parent's [`Emit`] flags.

use std::{collections::BTreeMap, marker::PhantomData};

use serde_json::Value;

use super::{Model, Schema};
use crate::{
    Document,
    convert::{Converter, Nesting},
    field::Emit,
};

/// A single nested model.
///
/// The lenient variant backs same-level groups: anything that is not a map
/// reads as an empty model instead of as absent.
pub struct SubModel<S> {
    lenient: bool,
    _schema: PhantomData<fn() -> S>,
}

impl<S> SubModel<S> {
    pub fn new() -> Self {
        Self {
            lenient: false,
            _schema: PhantomData,
        }
    }

    pub fn lenient() -> Self {
        Self {
            lenient: true,
            _schema: PhantomData,
        }
    }
}

impl<S> Default for SubModel<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> Converter<Model<S>> for SubModel<S> {
    fn to_native(&self, value: &Value, scope: &Nesting<'_>) -> Option<Model<S>> {
        match value {
            Value::Object(map) => Some(scope.adopt(map.clone())),
            _ if self.lenient => Some(scope.adopt(Document::new())),
            _ => None,
        }
    }

    fn to_document(&self, native: &Model<S>, emit: Emit) -> Option<Value> {
        Some(Value::Object(native.materialize(emit)))
    }

    fn rehome(&self, native: &Model<S>, scope: &Nesting<'_>) -> Option<Model<S>> {
        Some(scope.adopt_copy(native))
    }
}

/// An array of nested models. Reads as absent unless every element is a map.
pub struct ModelList<S>(PhantomData<fn() -> S>);

impl<S> ModelList<S> {
    pub fn new() -> Self {
        ModelList(PhantomData)
    }
}

impl<S> Default for ModelList<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> Converter<Vec<Model<S>>> for ModelList<S> {
    fn to_native(&self, value: &Value, scope: &Nesting<'_>) -> Option<Vec<Model<S>>> {
        value
            .as_array()?
            .iter()
            .map(|item| item.as_object().map(|map| scope.adopt(map.clone())))
            .collect()
    }

    fn to_document(&self, native: &Vec<Model<S>>, emit: Emit) -> Option<Value> {
        Some(Value::Array(
            native
                .iter()
                .map(|model| Value::Object(model.materialize(emit)))
                .collect(),
        ))
    }

    fn rehome(&self, native: &Vec<Model<S>>, scope: &Nesting<'_>) -> Option<Vec<Model<S>>> {
        Some(native.iter().map(|model| scope.adopt_copy(model)).collect())
    }
}

/// A string-keyed map of nested models. Reads as absent unless every value
/// is a map.
pub struct ModelMap<S>(PhantomData<fn() -> S>);

impl<S> ModelMap<S> {
    pub fn new() -> Self {
        ModelMap(PhantomData)
    }
}

impl<S> Default for ModelMap<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> Converter<BTreeMap<String, Model<S>>> for ModelMap<S> {
    fn to_native(
        &self,
        value: &Value,
        scope: &Nesting<'_>,
    ) -> Option<BTreeMap<String, Model<S>>> {
        value
            .as_object()?
            .iter()
            .map(|(key, item)| {
                item.as_object()
                    .map(|map| (key.clone(), scope.adopt(map.clone())))
            })
            .collect()
    }

    fn to_document(&self, native: &BTreeMap<String, Model<S>>, emit: Emit) -> Option<Value> {
        Some(Value::Object(
            native
                .iter()
                .map(|(key, model)| (key.clone(), Value::Object(model.materialize(emit))))
                .collect(),
        ))
    }

    fn rehome(
        &self,
        native: &BTreeMap<String, Model<S>>,
        scope: &Nesting<'_>,
    ) -> Option<BTreeMap<String, Model<S>>> {
        Some(
            native
                .iter()
                .map(|(key, model)| (key.clone(), scope.adopt_copy(model)))
                .collect(),
        )
    }
}
