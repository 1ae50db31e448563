//! Models: typed, cached views over one document.
//!
//! A [`Model`] owns an original [`Document`] it never mutates, a cache of
//! converted field values, and a [`Guard`] protecting that cache. The
//! fields themselves are declared by a [`Schema`] type, registered in order
//! through a [`Registry`], and reached through `Deref`.
//!
//! A model is either frozen or mutable for its whole life. Frozen models
//! reject writes; "unfreezing" or "freezing" means making a copy.
//!
//! # Usage
//!
//! ```
//! use docview::{Document, Field, Model, Registry, Schema};
//!
//! struct Point {
//!     x: Field<i64>,
//!     y: Field<i64>,
//! }
//!
//! impl Schema for Point {
//!     fn register(fields: &mut Registry) -> Self {
//!         Point {
//!             x: fields.int("pos.x", 0),
//!             y: fields.int("pos.y", 0),
//!         }
//!     }
//! }
//!
//! let point = Model::<Point>::from_json(r#"{"pos": {"x": 3}}"#, true)?;
//! assert_eq!(point.x.value(), 3);
//! assert_eq!(point.y.value(), 0);
//!
//! point.y.set(4)?;
//! assert_eq!(point.current_data(false, false)["pos"]["y"], 4);
//! assert!(point.original_data()["pos"].get("y").is_none());
//! # Ok::<(), docview::Error>(())
//! ```

use std::{
    any, fmt,
    ops::Deref,
    sync::{Arc, Weak},
};

use serde_json::Value;

use crate::{
    Document, Result,
    convert::ConversionService,
    field::Emit,
    lock::{Guard, GuardPool},
};

pub mod archive;
pub mod errors;
pub mod nested;
pub mod registry;
pub(crate) mod state;

pub use archive::Archive;
pub use errors::ModelError;
pub use nested::{ModelList, ModelMap, SubModel};
pub use registry::Registry;

use state::{HasState, ModelState};

/// A set of fields that can be laid over a document.
pub trait Schema: Sized + Send + Sync + 'static {
    /// Registers every field, in declaration order.
    fn register(fields: &mut Registry) -> Self;
}

/// Settings used when constructing a top-level model.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    mutable: bool,
    pool: Arc<GuardPool>,
    conversions: Arc<ConversionService>,
}

impl ModelOptions {
    /// Frozen, drawing from the shared guard pool and conversion service.
    pub fn new() -> Self {
        Self {
            mutable: false,
            pool: GuardPool::shared(),
            conversions: ConversionService::shared(),
        }
    }

    pub fn mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    pub fn pool(mut self, pool: Arc<GuardPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn conversions(mut self, conversions: Arc<ConversionService>) -> Self {
        self.conversions = conversions;
        self
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct ModelInner<S> {
    state: ModelState,
    schema: S,
}

impl<S: Schema> HasState for ModelInner<S> {
    fn state(&self) -> &ModelState {
        &self.state
    }
}

/// A typed view over a document.
///
/// Cloning is cheap and yields another handle to the same model; use
/// [`Model::mutable_copy`] or [`Model::frozen_copy`] for independent copies.
pub struct Model<S: Schema> {
    inner: Arc<ModelInner<S>>,
}

impl<S: Schema> Model<S> {
    /// Builds a model over `document` with default options.
    pub fn new(document: Document, mutable: bool) -> Self {
        Self::with_options(document, &ModelOptions::new().mutable(mutable))
    }

    pub fn with_options(document: Document, options: &ModelOptions) -> Self {
        Self::assemble(
            Arc::new(document),
            options.mutable,
            Guard::acquire(&options.pool),
            Arc::clone(&options.conversions),
        )
    }

    /// A mutable model over an empty document.
    pub fn empty() -> Self {
        Self::new(Document::new(), true)
    }

    /// Builds a model from an already decoded JSON value.
    ///
    /// # Errors
    /// [`ModelError::NotAnObject`] unless `value` is an object.
    pub fn from_value(value: Value, mutable: bool) -> Result<Self> {
        Self::from_value_with(value, &ModelOptions::new().mutable(mutable))
    }

    pub fn from_value_with(value: Value, options: &ModelOptions) -> Result<Self> {
        match value {
            Value::Object(document) => Ok(Self::with_options(document, options)),
            other => {
                tracing::debug!(kind = crate::doc::kind_of(&other), "rejecting non-object document");
                Err(ModelError::NotAnObject {
                    found: crate::doc::kind_of(&other).to_string(),
                }
                .into())
            }
        }
    }

    /// Decodes JSON text and builds a model over it.
    ///
    /// # Errors
    /// [`ModelError::Decode`] for malformed text and
    /// [`ModelError::NotAnObject`] when the top level is not an object.
    pub fn from_json(text: &str, mutable: bool) -> Result<Self> {
        Self::from_json_with(text, &ModelOptions::new().mutable(mutable))
    }

    pub fn from_json_with(text: &str, options: &ModelOptions) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|err| {
            tracing::debug!(error = %err, "failed to decode document text");
            ModelError::Decode {
                reason: err.to_string(),
            }
        })?;
        Self::from_value_with(value, options)
    }

    /// Like [`Model::from_json`], for raw bytes.
    ///
    /// # Errors
    /// [`ModelError::InvalidUtf8`] before any decoding is attempted.
    pub fn from_slice(bytes: &[u8], mutable: bool) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|err| ModelError::InvalidUtf8 {
            reason: err.to_string(),
        })?;
        Self::from_json(text, mutable)
    }

    pub(crate) fn assemble(
        original: Arc<Document>,
        mutable: bool,
        guard: Arc<Guard>,
        conversions: Arc<ConversionService>,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<ModelInner<S>>| {
            let host: Weak<dyn HasState> = weak.clone();
            let mut registry = Registry::new(host);
            let schema = S::register(&mut registry);
            let state = ModelState::new(
                original,
                mutable,
                registry.into_fields(),
                guard,
                conversions,
            );
            ModelInner { state, schema }
        });
        Self { inner }
    }

    /// Stand-in value for group fields that could not be read.
    pub(crate) fn placeholder() -> Self {
        Self::new(Document::new(), false)
    }

    fn state(&self) -> &ModelState {
        &self.inner.state
    }

    fn options(&self, mutable: bool) -> ModelOptions {
        ModelOptions::new()
            .mutable(mutable)
            .pool(Arc::clone(self.state().guard().pool()))
            .conversions(Arc::clone(self.state().conversions()))
    }

    pub(crate) fn original_arc(&self) -> &Arc<Document> {
        self.state().original()
    }

    pub(crate) fn guard(&self) -> &Arc<Guard> {
        self.state().guard()
    }

    pub(crate) fn adopt_cache(&self, source: &Model<S>) {
        self.state().adopt_cache(source.state());
    }

    pub(crate) fn materialize(&self, emit: Emit) -> Document {
        self.state().current_data(emit)
    }

    pub fn is_mutable(&self) -> bool {
        self.state().is_mutable()
    }

    /// The document this model was built from.
    pub fn original_data(&self) -> &Document {
        self.state().original()
    }

    /// Folds every field's current value into a fresh document.
    ///
    /// With `with_nulls`, fields without a value are written as `null`.
    /// With `for_output`, fields bound with [`crate::field::Binding::never`]
    /// are left out entirely.
    pub fn current_data(&self, with_nulls: bool, for_output: bool) -> Document {
        self.materialize(Emit::new(with_nulls, for_output))
    }

    /// The original document as pretty-printed JSON.
    pub fn original_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.original_data())?)
    }

    /// The current state, materialized for output, as pretty-printed JSON.
    pub fn current_json(&self, with_nulls: bool) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.current_data(with_nulls, true))?)
    }

    /// Drops every cached value and mutation.
    pub fn clear_mutations(&self) {
        tracing::trace!(schema = any::type_name::<S>(), "clearing mutations");
        self.state().cache().clear();
    }

    /// A frozen snapshot of the current state.
    ///
    /// Frozen models are returned as-is. A mutable model is materialized and
    /// the snapshot is built over the result, so its original document
    /// already contains every mutation.
    pub fn frozen_copy(&self) -> Self {
        if !self.is_mutable() {
            return self.clone();
        }
        Self::with_options(self.materialize(Emit::INTERNAL), &self.options(false))
    }

    /// An independent mutable copy carrying over pending mutations.
    pub fn mutable_copy(&self) -> Self {
        Self::copy_of(self, true, true)
    }

    /// Copies `source` into a new model of the requested mutability.
    ///
    /// `with_mutations` carries over the source's cache (mutable targets) or
    /// its materialized state (frozen targets); otherwise the copy starts
    /// from the source's original document.
    pub fn copy_of(source: &Model<S>, with_mutations: bool, mutable: bool) -> Self {
        match (mutable, with_mutations) {
            (false, true) => source.frozen_copy(),
            (false, false) if !source.is_mutable() => source.clone(),
            (false, false) | (true, false) => Self::assemble(
                Arc::clone(source.original_arc()),
                mutable,
                Guard::acquire(source.state().guard().pool()),
                Arc::clone(source.state().conversions()),
            ),
            (true, true) => {
                let copy = Self::assemble(
                    Arc::clone(source.original_arc()),
                    true,
                    Guard::acquire(source.state().guard().pool()),
                    Arc::clone(source.state().conversions()),
                );
                copy.adopt_cache(source);
                copy
            }
        }
    }

    /// True when both handles refer to the same model.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// True when both models are synchronized by the same guard, as a model
    /// and its sub-models are.
    pub fn shares_guard_with<T: Schema>(&self, other: &Model<T>) -> bool {
        Arc::ptr_eq(self.state().guard(), other.state().guard())
    }

    /// Number of cache entries, including "nothing" markers.
    #[cfg(any(test, feature = "testing"))]
    pub fn cached_entries(&self) -> usize {
        self.state().cache().len()
    }
}

impl<S: Schema> Clone for Model<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Schema> Deref for Model<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner.schema
    }
}

/// Models are equal when their materialized data is, ignoring
/// serialization modes.
impl<S: Schema> PartialEq for Model<S> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.materialize(Emit::INTERNAL) == other.materialize(Emit::INTERNAL)
    }
}

impl<S: Schema> fmt::Debug for Model<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("schema", &any::type_name::<S>())
            .field("mutable", &self.is_mutable())
            .field("data", &Value::Object(self.current_data(true, false)))
            .finish()
    }
}

impl<S: Schema> fmt::Display for Model<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = Value::Object(self.current_data(true, true));
        write!(
            f,
            "{} (mutable: {}) {:#}",
            any::type_name::<S>(),
            self.is_mutable(),
            data
        )
    }
}
