//! Error types for model construction and mutation.

use thiserror::Error;

/// Structured errors raised by models and their fields.
///
/// Conversion failures are not errors: a value that does not convert makes
/// the field read as absent.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    /// Input text is not valid JSON
    #[error("Failed to decode document: {reason}")]
    Decode { reason: String },

    /// Input decoded, but the top level is not an object
    #[error("Document must be a JSON object, found {found}")]
    NotAnObject { found: String },

    /// Input bytes are not UTF-8
    #[error("Document is not valid UTF-8: {reason}")]
    InvalidUtf8 { reason: String },

    /// A field of a frozen model was written to
    #[error("Cannot write field '{path}' of a frozen model")]
    Frozen { path: String },

    /// The field's model has already been dropped
    #[error("Field '{path}' is no longer attached to a model")]
    Detached { path: String },
}

impl ModelError {
    /// Check if this error means the input could not be turned into a document
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            ModelError::Decode { .. } | ModelError::NotAnObject { .. } | ModelError::InvalidUtf8 { .. }
        )
    }

    /// Check if this error is a write to a frozen model
    pub fn is_frozen_violation(&self) -> bool {
        matches!(self, ModelError::Frozen { .. })
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, ModelError::Detached { .. })
    }

    /// Get the field path if this is a field-level error
    pub fn path(&self) -> Option<&str> {
        match self {
            ModelError::Frozen { path } | ModelError::Detached { path } => Some(path),
            _ => None,
        }
    }
}

impl From<ModelError> for crate::Error {
    fn from(err: ModelError) -> Self {
        crate::Error::Model(err)
    }
}
