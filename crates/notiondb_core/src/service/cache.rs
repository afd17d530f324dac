//! Caller-owned local cache of remote documents.
//!
//! # Responsibility
//! - Map domain keys to the latest known document snapshot.
//! - Route single-field mutations through the mutator.
//!
//! # Invariants
//! - Entries are only replaced by complete remote responses.
//! - The cache is an explicit object; there is no process-global cache.

use crate::model::document::Document;
use crate::model::property::PropertyValue;
use crate::repo::record_store::StoreResult;
use crate::service::mutator::set_property;
use crate::transport::DocumentTransport;
use std::collections::BTreeMap;

/// Domain key → cached document snapshot.
#[derive(Debug, Clone, Default)]
pub struct DocumentCache {
    entries: BTreeMap<String, Document>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.entries.get(key)
    }

    /// Stores `document` under `key`, returning the previous snapshot.
    pub fn insert(&mut self, key: impl Into<String>, document: Document) -> Option<Document> {
        self.entries.insert(key.into(), document)
    }

    pub fn remove(&mut self, key: &str) -> Option<Document> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns cached keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Sets one field of the cached document for `key`.
    ///
    /// Returns `Ok(None)` when `key` is not cached, otherwise whether a
    /// remote write happened.
    pub fn set_property<T: DocumentTransport>(
        &mut self,
        transport: &T,
        key: &str,
        name: &str,
        value: PropertyValue,
    ) -> StoreResult<Option<bool>> {
        match self.entries.get_mut(key) {
            Some(document) => set_property(transport, document, name, value).map(Some),
            None => Ok(None),
        }
    }
}
