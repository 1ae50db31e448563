//!
//! docview: typed, cached, mutation-tracking views over JSON documents.
//!
//! ## Core Concepts
//!
//! * **Documents (`doc::Document`)**: decoded JSON objects. A model's original document is never mutated.
//! * **Paths (`doc::FieldPath`)**: where a field's value lives, either a sequence of map keys or the reserved same-level path used by field-groups.
//! * **Fields (`field::Field`)**: typed accessors bound to one path. Reads convert lazily and are cached; writes go to the cache only.
//! * **Models (`model::Model`)**: own the original document, the cache and the guard. Models are frozen or mutable for life; copies switch between the two.
//! * **Schemas (`model::Schema`)**: declare a model's fields through an ordered `model::Registry`.
//! * **Converters (`convert::Converter`)**: translate between document values and native types, from plain serde casts to lenient integers, boolean spellings, enum labels and dates.
//! * **Guards (`lock::Guard`)**: pooled reader/writer locks. A model and all of its sub-models share one guard.

pub mod constants;
pub mod convert;
pub mod doc;
pub mod field;
pub mod lock;
pub mod model;

pub use doc::{Document, FieldPath};
pub use field::{Binding, Field, SerializeMode, bind};
pub use model::{Model, ModelOptions, Registry, Schema};

/// Result type used throughout the docview library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the docview library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured model errors from the model module
    #[error(transparent)]
    Model(model::ModelError),

    /// Structured path errors from the doc module
    #[error(transparent)]
    Path(doc::PathError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Model(_) => "model",
            Error::Path(_) => "doc",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error means input could not be decoded into a model.
    pub fn is_decode_error(&self) -> bool {
        match self {
            Error::Model(model_err) => model_err.is_decode_error(),
            _ => false,
        }
    }

    /// Check if this error is a write to a frozen model.
    pub fn is_frozen_violation(&self) -> bool {
        match self {
            Error::Model(model_err) => model_err.is_frozen_violation(),
            _ => false,
        }
    }

    /// Check if this error is path-related.
    pub fn is_path_error(&self) -> bool {
        matches!(self, Error::Path(_))
    }

    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }
}
