//! Explicit, ordered field registration.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Weak},
};

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use super::{
    Model, Schema,
    nested::{ModelList, ModelMap, SubModel},
    state::HasState,
};
use crate::{
    constants::{SAME_LEVEL, SAME_LEVEL_END},
    convert::{
        BoolStyle, Converter, DateConverter, DateFormat, EnumConverter, IntString, LenientBool,
        LenientFloat, LenientInt, Optional, Serde, StringEnum, Tristate, TristateBool,
    },
    doc::FieldPath,
    field::{AnyField, Binding, Descriptor, Fallback, Field},
};

/// Collects a schema's fields while its model is being built.
///
/// Each helper registers one field and returns its typed handle; the schema
/// stores the handles in its own struct. Registration order is kept for
/// fields at the same depth.
pub struct Registry {
    host: Weak<dyn HasState>,
    fields: Vec<Arc<dyn AnyField>>,
}

impl Registry {
    pub(crate) fn new(host: Weak<dyn HasState>) -> Self {
        Self {
            host,
            fields: Vec::new(),
        }
    }

    pub(crate) fn into_fields(self) -> Vec<Arc<dyn AnyField>> {
        self.fields
    }

    /// Number of fields registered so far.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Registers a field with an explicit fallback and converter.
    pub fn register<T, C>(
        &mut self,
        binding: impl Into<Binding>,
        fallback: Fallback<T>,
        converter: C,
    ) -> Field<T>
    where
        T: Clone + Send + Sync + 'static,
        C: Converter<T> + 'static,
    {
        let binding = binding.into();
        // Same-level fields all resolve to the enclosing map; give each its
        // own cache slot.
        let key = match binding.path() {
            FieldPath::SameLevel => {
                format!("{SAME_LEVEL}{}{SAME_LEVEL_END}", self.fields.len())
            }
            path => path.to_string(),
        };
        let descriptor = Arc::new(Descriptor::new(
            binding,
            key,
            fallback,
            Box::new(converter),
        ));
        self.fields.push(Arc::clone(&descriptor) as Arc<dyn AnyField>);
        Field::new(descriptor, Weak::clone(&self.host))
    }

    /// A field cast directly through serde.
    pub fn field<T>(&mut self, binding: impl Into<Binding>, default: T) -> Field<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.register(binding, Fallback::Value(default), Serde::<T>::new())
    }

    pub fn optional<T>(&mut self, binding: impl Into<Binding>) -> Field<Option<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.register(binding, Fallback::Value(None), Optional(Serde::<T>::new()))
    }

    /// A field with a custom converter.
    pub fn convert<T, C>(&mut self, binding: impl Into<Binding>, default: T, converter: C) -> Field<T>
    where
        T: Clone + Send + Sync + 'static,
        C: Converter<T> + 'static,
    {
        self.register(binding, Fallback::Value(default), converter)
    }

    /// A nested model; absent unless the document holds a map there.
    pub fn model<S: Schema>(&mut self, binding: impl Into<Binding>) -> Field<Option<Model<S>>> {
        self.register(binding, Fallback::Value(None), Optional(SubModel::<S>::new()))
    }

    pub fn models<S: Schema>(&mut self, binding: impl Into<Binding>) -> Field<Vec<Model<S>>> {
        self.register(binding, Fallback::Value(Vec::new()), ModelList::<S>::new())
    }

    pub fn optional_models<S: Schema>(
        &mut self,
        binding: impl Into<Binding>,
    ) -> Field<Option<Vec<Model<S>>>> {
        self.register(binding, Fallback::Value(None), Optional(ModelList::<S>::new()))
    }

    pub fn model_map<S: Schema>(
        &mut self,
        binding: impl Into<Binding>,
    ) -> Field<BTreeMap<String, Model<S>>> {
        self.register(
            binding,
            Fallback::Value(BTreeMap::new()),
            ModelMap::<S>::new(),
        )
    }

    pub fn optional_model_map<S: Schema>(
        &mut self,
        binding: impl Into<Binding>,
    ) -> Field<Option<BTreeMap<String, Model<S>>>> {
        self.register(binding, Fallback::Value(None), Optional(ModelMap::<S>::new()))
    }

    /// A field-group: a nested schema whose fields live in this model's own
    /// map rather than under a key.
    pub fn group<S: Schema>(&mut self) -> Field<Model<S>> {
        self.register(
            FieldPath::same_level(),
            Fallback::With(Model::<S>::placeholder as fn() -> Model<S>),
            SubModel::<S>::lenient(),
        )
    }

    pub fn int(&mut self, binding: impl Into<Binding>, default: i64) -> Field<i64> {
        self.register(binding, Fallback::Value(default), LenientInt)
    }

    pub fn optional_int(&mut self, binding: impl Into<Binding>) -> Field<Option<i64>> {
        self.register(binding, Fallback::Value(None), Optional(LenientInt))
    }

    /// An integer written back as a decimal string.
    pub fn int_string(&mut self, binding: impl Into<Binding>, default: i64) -> Field<i64> {
        self.register(binding, Fallback::Value(default), IntString)
    }

    pub fn optional_int_string(&mut self, binding: impl Into<Binding>) -> Field<Option<i64>> {
        self.register(binding, Fallback::Value(None), Optional(IntString))
    }

    pub fn float(&mut self, binding: impl Into<Binding>, default: f64) -> Field<f64> {
        self.register(binding, Fallback::Value(default), LenientFloat)
    }

    pub fn boolean(
        &mut self,
        binding: impl Into<Binding>,
        default: bool,
        style: BoolStyle,
    ) -> Field<bool> {
        self.register(binding, Fallback::Value(default), LenientBool(style))
    }

    pub fn tristate(&mut self, binding: impl Into<Binding>, style: BoolStyle) -> Field<Tristate> {
        self.register(binding, Fallback::Value(Tristate::NotSet), TristateBool(style))
    }

    pub fn string_enum<E: StringEnum>(&mut self, binding: impl Into<Binding>, default: E) -> Field<E> {
        self.register(binding, Fallback::Value(default), EnumConverter::<E>::new())
    }

    /// An optional date, written in `format` and read in any known grammar.
    pub fn date(
        &mut self,
        binding: impl Into<Binding>,
        format: DateFormat,
    ) -> Field<Option<DateTime<Utc>>> {
        self.register(binding, Fallback::Value(None), DateConverter(format))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "paths",
                &self
                    .fields
                    .iter()
                    .map(|field| field.path().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
