//! Runtime state shared by every model regardless of schema.

use std::{borrow::Cow, collections::HashMap, sync::Arc};

use serde_json::Value;

use crate::{
    Document,
    convert::{ConversionService, Nesting},
    doc::{self, FieldPath},
    field::{AnyField, Emit, SerializeMode, cache::Cache},
    lock::Guard,
};

/// Implemented by the model's shared allocation so fields can reach the
/// state through a type-erased weak reference.
pub(crate) trait HasState: Send + Sync {
    fn state(&self) -> &ModelState;
}

pub(crate) struct ModelState {
    original: Arc<Document>,
    mutable: bool,
    /// Sorted by path depth, stable within a depth.
    fields: Vec<Arc<dyn AnyField>>,
    cache: Cache,
    conversions: Arc<ConversionService>,
}

impl ModelState {
    pub(crate) fn new(
        original: Arc<Document>,
        mutable: bool,
        mut fields: Vec<Arc<dyn AnyField>>,
        guard: Arc<Guard>,
        conversions: Arc<ConversionService>,
    ) -> Self {
        fields.sort_by_key(|field| field.path().depth());
        Self {
            original,
            mutable,
            fields,
            cache: Cache::new(guard),
            conversions,
        }
    }

    pub(crate) fn original(&self) -> &Arc<Document> {
        &self.original
    }

    pub(crate) fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub(crate) fn cache(&self) -> &Cache {
        &self.cache
    }

    pub(crate) fn guard(&self) -> &Arc<Guard> {
        self.cache.guard()
    }

    pub(crate) fn conversions(&self) -> &Arc<ConversionService> {
        &self.conversions
    }

    pub(crate) fn nesting(&self) -> Nesting<'_> {
        Nesting::new(self.mutable, self.guard(), &self.conversions)
    }

    /// Reads `path` from the original document.
    pub(crate) fn extract(&self, path: &FieldPath) -> Option<Cow<'_, Value>> {
        doc::get(&self.original, path)
    }

    /// Folds every field's current value into a fresh document.
    ///
    /// Fields are visited shallowest first, so a same-level group has merged
    /// its keys before any deeper field writes beneath them.
    pub(crate) fn current_data(&self, emit: Emit) -> Document {
        let mut data = Document::new();
        for field in &self.fields {
            let hidden = emit.for_output && field.serialize_mode() == SerializeMode::Never;
            match field.raw(self, emit) {
                Some(value) => {
                    doc::set(&mut data, field.path(), value, true);
                }
                None if emit.with_nulls && !hidden => {
                    doc::set(&mut data, field.path(), Value::Null, true);
                }
                None => {}
            }
        }
        data
    }

    /// Replaces this state's cache with a copy of `source`'s, re-targeting
    /// sub-models at this state's guard.
    pub(crate) fn adopt_cache(&self, source: &ModelState) {
        let mut snapshot = source.cache.snapshot();
        let scope = self.nesting();
        let mut adopted = HashMap::with_capacity(snapshot.len());
        for field in &self.fields {
            if let Some(slot) = snapshot.remove(field.key()) {
                adopted.insert(field.key().to_string(), field.rehome(slot, &scope));
            }
        }
        self.cache.replace(adopted);
    }
}
