//! Typed accessors bound to one path inside a model's document.
//!
//! A [`Field`] is created by [`crate::model::Registry`] while a model is
//! being built and lives inside the model's schema struct. Reads go through
//! the model's cache: a miss extracts the value from the original document,
//! converts it, and caches the result (or an explicit "nothing" when
//! extraction or conversion fails). Writes replace the cache entry and never
//! touch the original document.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use serde_json::Value;

use crate::{
    Result,
    convert::{Converter, Nesting},
    doc::FieldPath,
    model::{ModelError, state::HasState, state::ModelState},
};

pub(crate) mod cache;

use cache::Slot;

/// Whether a field appears in documents materialized for external output.
///
/// Internal materialization (equality, persistence, frozen copies) always
/// includes every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SerializeMode {
    #[default]
    Always,
    Never,
}

/// Where a field lives and how it is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    path: FieldPath,
    mode: SerializeMode,
}

/// Starts a [`Binding`] at a dotted path.
///
/// ```
/// use docview::field::{SerializeMode, bind};
///
/// let binding = bind("purchase.adjustment").never();
/// assert_eq!(binding.mode(), SerializeMode::Never);
/// ```
pub fn bind(path: impl Into<FieldPath>) -> Binding {
    Binding {
        path: path.into(),
        mode: SerializeMode::Always,
    }
}

impl Binding {
    /// Excludes the field from output materialization.
    pub fn never(mut self) -> Self {
        self.mode = SerializeMode::Never;
        self
    }

    pub fn always(mut self) -> Self {
        self.mode = SerializeMode::Always;
        self
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn mode(&self) -> SerializeMode {
        self.mode
    }
}

impl From<&str> for Binding {
    fn from(path: &str) -> Self {
        bind(path)
    }
}

impl From<String> for Binding {
    fn from(path: String) -> Self {
        bind(path)
    }
}

impl From<FieldPath> for Binding {
    fn from(path: FieldPath) -> Self {
        bind(path)
    }
}

/// Flags controlling materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Emit {
    /// Write an explicit `null` for fields without a value.
    pub with_nulls: bool,
    /// Honor [`SerializeMode::Never`].
    pub for_output: bool,
}

impl Emit {
    /// No nulls, every field included. Used for equality, persistence and
    /// frozen snapshots.
    pub const INTERNAL: Emit = Emit {
        with_nulls: false,
        for_output: false,
    };

    pub fn new(with_nulls: bool, for_output: bool) -> Self {
        Self {
            with_nulls,
            for_output,
        }
    }
}

/// The value a field reads as when it has none.
pub enum Fallback<T> {
    Value(T),
    /// Built on demand; used where constructing the default is not free.
    With(fn() -> T),
}

impl<T: Clone> Fallback<T> {
    pub fn produce(&self) -> T {
        match self {
            Fallback::Value(value) => value.clone(),
            Fallback::With(build) => build(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Fallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Fallback::With(_) => f.write_str("With(..)"),
        }
    }
}

/// Type-erased view of a descriptor, used by the model to materialize and
/// copy caches without knowing each field's native type.
pub(crate) trait AnyField: Send + Sync {
    fn path(&self) -> &FieldPath;
    fn key(&self) -> &str;
    fn serialize_mode(&self) -> SerializeMode;
    fn raw(&self, state: &ModelState, emit: Emit) -> Option<Value>;
    /// Re-targets a cached value at the copy described by `scope`.
    fn rehome(&self, slot: Slot, scope: &Nesting<'_>) -> Slot;
}

pub(crate) struct Descriptor<T> {
    path: FieldPath,
    key: String,
    mode: SerializeMode,
    fallback: Fallback<T>,
    converter: Box<dyn Converter<T>>,
}

impl<T> Descriptor<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        binding: Binding,
        key: String,
        fallback: Fallback<T>,
        converter: Box<dyn Converter<T>>,
    ) -> Self {
        Self {
            path: binding.path,
            key,
            mode: binding.mode,
            fallback,
            converter,
        }
    }

    /// Cached read; populates the cache on a miss.
    fn read(&self, state: &ModelState) -> Option<T> {
        let cache = state.cache();
        if let Some(slot) = cache.lookup(&self.key) {
            return slot.downcast::<T>();
        }

        tracing::trace!(path = %self.path, "cache miss, extracting");
        let converted = state
            .extract(&self.path)
            .and_then(|found| self.converter.to_native(&found, &state.nesting()));
        let slot = match converted {
            Some(native) => Slot::of(native),
            None => Slot::Nothing,
        };
        cache.populate(&self.key, slot).downcast::<T>()
    }

    fn value(&self, state: &ModelState) -> T {
        self.read(state).unwrap_or_else(|| self.fallback.produce())
    }

    fn ensure_mutable(&self, state: &ModelState) -> Result<()> {
        if state.is_mutable() {
            return Ok(());
        }
        tracing::warn!(path = %self.path, "write to frozen model rejected");
        Err(ModelError::Frozen {
            path: self.path.to_string(),
        }
        .into())
    }

    fn store(&self, state: &ModelState, slot: Slot) -> Result<()> {
        self.ensure_mutable(state)?;
        state.cache().store(&self.key, slot);
        Ok(())
    }

    /// Writes a native value. Sub-models are moved under this model's guard
    /// first, and values the converter treats as empty become the nothing
    /// marker.
    fn assign(&self, state: &ModelState, value: T) -> Result<()> {
        self.ensure_mutable(state)?;
        let slot = if self.converter.is_nothing(&value) {
            Slot::Nothing
        } else {
            let value = self
                .converter
                .rehome(&value, &state.nesting())
                .unwrap_or(value);
            Slot::of(value)
        };
        state.cache().store(&self.key, slot);
        Ok(())
    }
}

impl<T> AnyField for Descriptor<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn path(&self) -> &FieldPath {
        &self.path
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn serialize_mode(&self) -> SerializeMode {
        self.mode
    }

    fn raw(&self, state: &ModelState, emit: Emit) -> Option<Value> {
        if emit.for_output && self.mode == SerializeMode::Never {
            return None;
        }
        self.converter.to_document(&self.value(state), emit)
    }

    fn rehome(&self, slot: Slot, scope: &Nesting<'_>) -> Slot {
        let Some(native) = slot.downcast::<T>() else {
            return slot;
        };
        match self.converter.rehome(&native, scope) {
            Some(copy) => Slot::of(copy),
            None => slot,
        }
    }
}

/// A typed accessor for one path of a model.
///
/// Fields are owned by the model's schema and hold only a weak reference
/// back to the model, so they never keep it alive.
pub struct Field<T> {
    descriptor: Arc<Descriptor<T>>,
    host: Weak<dyn HasState>,
}

impl<T> Field<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(descriptor: Arc<Descriptor<T>>, host: Weak<dyn HasState>) -> Self {
        Self { descriptor, host }
    }

    fn with_state<R>(&self, f: impl FnOnce(&ModelState) -> R) -> Option<R> {
        let host = self.host.upgrade()?;
        Some(f(host.state()))
    }

    pub fn path(&self) -> &FieldPath {
        &self.descriptor.path
    }

    pub fn serialize_mode(&self) -> SerializeMode {
        self.descriptor.mode
    }

    pub fn default_value(&self) -> T {
        self.descriptor.fallback.produce()
    }

    /// The current value, or the default when the field has none.
    pub fn value(&self) -> T {
        self.get().unwrap_or_else(|| self.default_value())
    }

    /// The current value without falling back to the default.
    pub fn get(&self) -> Option<T> {
        self.with_state(|state| self.descriptor.read(state)).flatten()
    }

    pub fn has_value(&self) -> bool {
        self.get().is_some()
    }

    /// Replaces the field's value in the model's cache.
    ///
    /// # Errors
    /// [`ModelError::Frozen`] when the model is frozen; the cache is left
    /// untouched.
    pub fn set(&self, value: T) -> Result<()> {
        self.with_state(|state| self.descriptor.assign(state, value))
            .unwrap_or_else(|| Err(self.detached()))
    }

    /// Marks the field as intentionally empty. Reads return the default
    /// until the next [`Field::set`] or [`Field::clear`].
    pub fn set_null(&self) -> Result<()> {
        self.write(Slot::Nothing)
    }

    /// Forgets any cached or mutated value, so the next read goes back to
    /// the original document.
    pub fn clear(&self) {
        self.with_state(|state| state.cache().remove(&self.descriptor.key));
    }

    /// The field's current value in document form.
    pub fn raw(&self, with_nulls: bool, for_output: bool) -> Option<Value> {
        self.with_state(|state| self.descriptor.raw(state, Emit::new(with_nulls, for_output)))
            .flatten()
    }

    fn write(&self, slot: Slot) -> Result<()> {
        self.with_state(|state| self.descriptor.store(state, slot))
            .unwrap_or_else(|| Err(self.detached()))
    }

    fn detached(&self) -> crate::Error {
        ModelError::Detached {
            path: self.descriptor.path.to_string(),
        }
        .into()
    }
}

impl<T> fmt::Debug for Field<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("path", self.path())
            .field("mode", &self.serialize_mode())
            .field("value", &self.get())
            .finish()
    }
}
