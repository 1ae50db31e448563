//! Per-model cache of converted field values.
//!
//! Entries are keyed by the field's cache key (its dotted path, or a unique
//! same-level key for groups). A missing entry means "not extracted yet";
//! [`Slot::Nothing`] records an intentional or failed extraction.
//!
//! Every access goes through the model tree's [`Guard`]: lookups in read
//! mode, every mutation in write mode.

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use crate::lock::Guard;

/// A cached native value, or the explicit "nothing" marker.
#[derive(Clone)]
pub(crate) enum Slot {
    Value(Arc<dyn Any + Send + Sync>),
    Nothing,
}

impl Slot {
    pub(crate) fn of<T: Send + Sync + 'static>(value: T) -> Self {
        Slot::Value(Arc::new(value))
    }

    /// Clones the cached value out if it has type `T`.
    ///
    /// The nothing marker and values of another type both read as `None`.
    pub(crate) fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        match self {
            Slot::Value(value) => value.downcast_ref::<T>().cloned(),
            Slot::Nothing => None,
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(_) => write!(f, "Slot::Value(..)"),
            Slot::Nothing => write!(f, "Slot::Nothing"),
        }
    }
}

pub(crate) struct Cache {
    guard: Arc<Guard>,
    entries: RwLock<HashMap<String, Slot>>,
}

impl Cache {
    pub(crate) fn new(guard: Arc<Guard>) -> Self {
        Self {
            guard,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn guard(&self) -> &Arc<Guard> {
        &self.guard
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<Slot> {
        self.guard.read(|| {
            self.entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .cloned()
        })
    }

    /// Inserts `slot` unless another writer got there first, returning the
    /// slot that ends up resident.
    pub(crate) fn populate(&self, key: &str, slot: Slot) -> Slot {
        self.guard.write(|| {
            self.entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key.to_string())
                .or_insert(slot)
                .clone()
        })
    }

    pub(crate) fn store(&self, key: &str, slot: Slot) {
        let previous = self.guard.write(|| {
            self.entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.to_string(), slot)
        });
        // Old values may own sub-models; release them outside the guard.
        drop(previous);
    }

    pub(crate) fn remove(&self, key: &str) {
        let previous = self.guard.write(|| {
            self.entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(key)
        });
        drop(previous);
    }

    pub(crate) fn clear(&self) {
        let previous = self.guard.write(|| {
            std::mem::take(&mut *self.entries.write().unwrap_or_else(PoisonError::into_inner))
        });
        drop(previous);
    }

    pub(crate) fn snapshot(&self) -> HashMap<String, Slot> {
        self.guard.read(|| {
            self.entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }

    pub(crate) fn replace(&self, entries: HashMap<String, Slot>) {
        let previous = self.guard.write(|| {
            std::mem::replace(
                &mut *self.entries.write().unwrap_or_else(PoisonError::into_inner),
                entries,
            )
        });
        drop(previous);
    }

    pub(crate) fn len(&self) -> usize {
        self.guard.read(|| {
            self.entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        })
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("entries", &self.len()).finish()
    }
}
