//! The generic document tree and the path engine over it.
//!
//! A [`Document`] is a string-keyed JSON map, exactly what `serde_json`
//! produces when decoding an object. Models never mutate the document they
//! were built from; materialization writes into a fresh [`Document`] with
//! [`set`].
//!
//! # Usage
//!
//! ```
//! use docview::doc::{self, Document, FieldPath};
//! use serde_json::json;
//!
//! let mut out = Document::new();
//! doc::set(&mut out, &FieldPath::parse("a.b"), json!(1), true);
//! assert_eq!(out["a"]["b"], 1);
//!
//! let found = doc::get(&out, &FieldPath::parse("a.b"));
//! assert_eq!(found.as_deref(), Some(&json!(1)));
//! ```

use std::borrow::Cow;

use serde_json::Value;

pub mod path;

pub use path::{Component, FieldPath, PathError};

/// A decoded JSON object.
pub type Document = serde_json::Map<String, Value>;

/// Reads the value at `path`.
///
/// The same-level path yields the whole document. Key paths descend through
/// nested maps and yield `None` when an intermediate key is missing or not a
/// map, when the final key is missing, or when the path is empty.
pub fn get<'a>(document: &'a Document, path: &FieldPath) -> Option<Cow<'a, Value>> {
    match path {
        FieldPath::SameLevel => Some(Cow::Owned(Value::Object(document.clone()))),
        FieldPath::Keys(keys) => {
            let (first, rest) = keys.split_first()?;
            let mut current = document.get(first)?;
            for key in rest {
                current = current.as_object()?.get(key)?;
            }
            Some(Cow::Borrowed(current))
        }
    }
}

/// Writes `value` at `path`, returning whether the write was applied.
///
/// Missing intermediate maps are created only when `create_missing` is set.
/// An intermediate that exists but is not a map is left untouched and the
/// write is dropped.
///
/// Writing a map to the same-level path merges its top-level entries into
/// `document` one key at a time. Any other value written to the same-level
/// path is dropped.
pub fn set(document: &mut Document, path: &FieldPath, value: Value, create_missing: bool) -> bool {
    match path {
        FieldPath::SameLevel => match value {
            Value::Object(entries) => {
                for (key, entry) in entries {
                    document.insert(key, entry);
                }
                true
            }
            other => {
                tracing::debug!(
                    kind = kind_of(&other),
                    "dropping non-map value written to the same level"
                );
                false
            }
        },
        FieldPath::Keys(keys) => set_keys(document, keys, value, create_missing),
    }
}

fn set_keys(document: &mut Document, keys: &[String], value: Value, create_missing: bool) -> bool {
    let Some((last, parents)) = keys.split_last() else {
        return false;
    };

    let mut current = document;
    for key in parents {
        if !current.contains_key(key) {
            if !create_missing {
                return false;
            }
            current.insert(key.clone(), Value::Object(Document::new()));
        }
        match current.get_mut(key) {
            Some(Value::Object(child)) => current = child,
            Some(other) => {
                tracing::debug!(
                    key = %key,
                    kind = kind_of(other),
                    "intermediate is not a map, dropping write"
                );
                return false;
            }
            None => return false,
        }
    }

    current.insert(last.clone(), value);
    true
}

/// Short name of a JSON value's kind, for diagnostics.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
