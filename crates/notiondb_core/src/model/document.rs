//! Remote document snapshot.
//!
//! # Responsibility
//! - Hold one wire-format record exactly as the remote store returned it.
//!
//! # Invariants
//! - `id` is assigned by the remote store and never changes.
//! - Archival is a flag; the core never erases documents.
//! - Fields the core does not model are preserved in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name → tagged wire field value.
pub type PropertyMap = Map<String, Value>;

/// Remote document id.
pub type DocumentId = String;

/// One record of the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: PropertyMap,
    /// Remaining document metadata (parent, timestamps, urls).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, properties: PropertyMap) -> Self {
        Self {
            id: id.into(),
            archived: false,
            properties,
            extra: Map::new(),
        }
    }

    /// Returns the raw tagged field, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Replaces the whole snapshot with a fresher copy from the remote store.
    pub fn replace_with(&mut self, fresh: Document) {
        *self = fresh;
    }
}
