//! Converters between document values and native field types.
//!
//! Every field carries one [`Converter`]. The default, [`Serde`], casts
//! through `serde_json`; the other adapters in this module implement the
//! lenient encodings real-world documents tend to contain (numbers as
//! strings, several boolean spellings, string-keyed enums, half a dozen date
//! grammars).
//!
//! Converters never fail loudly. `None` from [`Converter::to_native`] makes
//! the field read as absent; `None` from [`Converter::to_document`] omits it
//! from materialized output.

use std::{fmt, marker::PhantomData, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    field::Emit,
    lock::Guard,
    model::{Model, Schema},
};

pub mod boolean;
pub mod date;
pub mod enums;
pub mod number;
pub mod service;

pub use boolean::{BoolStyle, LenientBool, Tristate, TristateBool};
pub use date::{DateConverter, DateFormat};
pub use enums::{EnumConverter, StringEnum};
pub use number::{IntString, LenientFloat, LenientInt};
pub use service::ConversionService;

/// Context handed to converters while a model is reading or copying.
///
/// Converters that build sub-models use it so the children inherit the
/// parent's mutability, guard and conversion service.
pub struct Nesting<'a> {
    mutable: bool,
    guard: &'a Arc<Guard>,
    conversions: &'a Arc<ConversionService>,
}

impl<'a> Nesting<'a> {
    pub(crate) fn new(
        mutable: bool,
        guard: &'a Arc<Guard>,
        conversions: &'a Arc<ConversionService>,
    ) -> Self {
        Self {
            mutable,
            guard,
            conversions,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn conversions(&self) -> &ConversionService {
        self.conversions
    }

    /// Builds a sub-model over `document` that shares this scope's guard.
    pub fn adopt<S: Schema>(&self, document: crate::Document) -> Model<S> {
        Model::assemble(
            Arc::new(document),
            self.mutable,
            Arc::clone(self.guard),
            Arc::clone(self.conversions),
        )
    }

    /// Builds an independent copy of `source` inside this scope.
    ///
    /// The copy starts from the same original document and a copy of the
    /// source's cache, but shares this scope's guard instead of the source's.
    /// A model already living under this scope's guard is returned as is.
    pub fn adopt_copy<S: Schema>(&self, source: &Model<S>) -> Model<S> {
        if Arc::ptr_eq(source.guard(), self.guard) {
            return source.clone();
        }
        let copy: Model<S> = Model::assemble(
            Arc::clone(source.original_arc()),
            self.mutable,
            Arc::clone(self.guard),
            Arc::clone(self.conversions),
        );
        copy.adopt_cache(source);
        copy
    }
}

impl fmt::Debug for Nesting<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nesting")
            .field("mutable", &self.mutable)
            .finish_non_exhaustive()
    }
}

/// Two-way conversion between a document value and a native `T`.
pub trait Converter<T>: Send + Sync {
    /// Converts a value found in the document. `None` means "treat as
    /// absent".
    fn to_native(&self, value: &Value, scope: &Nesting<'_>) -> Option<T>;

    /// Converts a native value back into document form. `None` omits the
    /// field.
    fn to_document(&self, native: &T, emit: Emit) -> Option<Value>;

    /// Produces a copy of `native` for a duplicated model, or `None` when a
    /// plain clone is already independent.
    fn rehome(&self, _native: &T, _scope: &Nesting<'_>) -> Option<T> {
        None
    }

    /// Whether `native` stands for "no value". Such values are cached as an
    /// explicit nothing marker when written.
    fn is_nothing(&self, _native: &T) -> bool {
        false
    }
}

/// Direct cast through `serde_json`.
///
/// `null` reads as absent, and a native value that serializes to `null`
/// is omitted.
pub struct Serde<T>(PhantomData<fn() -> T>);

impl<T> Serde<T> {
    pub fn new() -> Self {
        Serde(PhantomData)
    }
}

impl<T> Default for Serde<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Converter<T> for Serde<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_native(&self, value: &Value, _scope: &Nesting<'_>) -> Option<T> {
        if value.is_null() {
            return None;
        }
        match T::deserialize(value) {
            Ok(native) => Some(native),
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    kind = crate::doc::kind_of(value),
                    "value does not cast to the field type"
                );
                None
            }
        }
    }

    fn to_document(&self, native: &T, _emit: Emit) -> Option<Value> {
        serde_json::to_value(native)
            .ok()
            .filter(|value| !value.is_null())
    }
}

/// Lifts a converter for `T` into one for `Option<T>`.
///
/// A value the inner converter rejects reads as absent, and writing `None`
/// stores the nothing marker, so the field reports "no value" either way.
pub struct Optional<C>(pub C);

impl<T, C> Converter<Option<T>> for Optional<C>
where
    C: Converter<T>,
{
    fn to_native(&self, value: &Value, scope: &Nesting<'_>) -> Option<Option<T>> {
        self.0.to_native(value, scope).map(Some)
    }

    fn to_document(&self, native: &Option<T>, emit: Emit) -> Option<Value> {
        native
            .as_ref()
            .and_then(|inner| self.0.to_document(inner, emit))
    }

    fn rehome(&self, native: &Option<T>, scope: &Nesting<'_>) -> Option<Option<T>> {
        let inner = native.as_ref()?;
        self.0.rehome(inner, scope).map(Some)
    }

    fn is_nothing(&self, native: &Option<T>) -> bool {
        native.is_none()
    }
}

/// A converter assembled from two plain functions.
///
/// ```
/// use docview::convert::from_fn;
/// use serde_json::{Value, json};
///
/// let upper = from_fn(
///     |value: &Value| value.as_str().map(str::to_uppercase),
///     |native: &String| Some(json!(native.to_lowercase())),
/// );
/// # let _ = upper;
/// ```
pub fn from_fn<T, R, W>(read: R, write: W) -> Mapped<T, R, W>
where
    R: Fn(&Value) -> Option<T> + Send + Sync,
    W: Fn(&T) -> Option<Value> + Send + Sync,
{
    Mapped {
        read,
        write,
        _native: PhantomData,
    }
}

/// See [`from_fn`].
pub struct Mapped<T, R, W> {
    read: R,
    write: W,
    _native: PhantomData<fn() -> T>,
}

impl<T, R, W> Converter<T> for Mapped<T, R, W>
where
    R: Fn(&Value) -> Option<T> + Send + Sync,
    W: Fn(&T) -> Option<Value> + Send + Sync,
{
    fn to_native(&self, value: &Value, _scope: &Nesting<'_>) -> Option<T> {
        (self.read)(value)
    }

    fn to_document(&self, native: &T, _emit: Emit) -> Option<Value> {
        (self.write)(native)
    }
}
