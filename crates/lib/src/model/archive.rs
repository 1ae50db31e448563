//! Persistence encoding for models.
//!
//! A model is archived as the pair `[mutable, data]`. Frozen models store
//! their untouched original document; mutable models store their
//! materialized current state, so pending mutations survive the round trip
//! as part of the restored model's original document.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Model, ModelError, ModelOptions, Schema};
use crate::{Document, Result, field::Emit};

/// The persisted form of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Archive {
    pub mutable: bool,
    pub data: Document,
}

impl Serialize for Archive {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> std::result::Result<Se::Ok, Se::Error> {
        (self.mutable, &self.data).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Archive {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (mutable, data) = <(bool, Document)>::deserialize(deserializer)?;
        Ok(Archive { mutable, data })
    }
}

impl<S: Schema> Model<S> {
    pub fn archive(&self) -> Archive {
        let data = if self.is_mutable() {
            self.materialize(Emit::INTERNAL)
        } else {
            self.original_data().clone()
        };
        Archive {
            mutable: self.is_mutable(),
            data,
        }
    }

    pub fn from_archive(archive: Archive) -> Self {
        Self::from_archive_with(archive, &ModelOptions::new())
    }

    /// Restores a model; the archived flag overrides `options`' mutability.
    pub fn from_archive_with(archive: Archive, options: &ModelOptions) -> Self {
        let options = options.clone().mutable(archive.mutable);
        Self::with_options(archive.data, &options)
    }

    pub fn to_archive_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.archive())?)
    }

    /// # Errors
    /// [`ModelError::Decode`] when `bytes` is not an encoded archive.
    pub fn from_archive_bytes(bytes: &[u8]) -> Result<Self> {
        let archive: Archive = serde_json::from_slice(bytes).map_err(|err| ModelError::Decode {
            reason: err.to_string(),
        })?;
        Ok(Self::from_archive(archive))
    }
}

impl<S: Schema> Serialize for Model<S> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> std::result::Result<Se::Ok, Se::Error> {
        self.archive().serialize(serializer)
    }
}

impl<'de, S: Schema> Deserialize<'de> for Model<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Archive::deserialize(deserializer).map(Model::from_archive)
    }
}
