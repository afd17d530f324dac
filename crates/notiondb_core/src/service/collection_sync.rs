//! Collection-level synchronization between the cache and the remote store.
//!
//! # Responsibility
//! - Load a remote collection into a `DocumentCache` keyed by a domain field.
//! - Upsert and archive records by domain key.
//!
//! # Invariants
//! - Documents without a usable key value are skipped, never cached.
//! - A key field that fails to decode aborts the load with its error.
//! - Every cache write stores the complete remote response.
//! - Archived records are dropped from the cache.

use crate::codec::{decode, CodecError};
use crate::config::SyncConfig;
use crate::model::document::Document;
use crate::model::property::PropertyDescriptor;
use crate::repo::record_store::{RecordStore, StoreResult};
use crate::service::cache::DocumentCache;
use crate::transport::DocumentTransport;
use log::{debug, info};

/// Result of `CollectionSync::upsert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Synchronizes one configured collection.
pub struct CollectionSync<'s, T: DocumentTransport> {
    store: &'s RecordStore<T>,
    config: SyncConfig,
}

impl<'s, T: DocumentTransport> CollectionSync<'s, T> {
    pub fn new(store: &'s RecordStore<T>, config: SyncConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the domain key of `document`.
    ///
    /// A missing key field or a value with no key form yields `Ok(None)`;
    /// any other decode failure is returned.
    pub fn key_of(&self, document: &Document) -> StoreResult<Option<String>> {
        match decode(document, &self.config.key_field) {
            Ok(value) => Ok(value.as_key()),
            Err(CodecError::FieldNotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces the cache content with the current remote collection.
    ///
    /// Returns the number of cached documents.
    pub fn load(&self, cache: &mut DocumentCache) -> StoreResult<usize> {
        cache.clear();
        let mut skipped = 0usize;
        for batch in self.store.read(&self.config.collection_id) {
            for document in batch? {
                match self.key_of(&document)? {
                    Some(key) => {
                        cache.insert(key, document);
                    }
                    None => {
                        skipped += 1;
                        debug!(
                            "event=cache_load module=service status=skipped document={}",
                            document.id
                        );
                    }
                }
            }
        }
        info!(
            "event=cache_load module=service status=ok collection={} cached={} skipped={}",
            self.config.collection_id,
            cache.len(),
            skipped
        );
        Ok(cache.len())
    }

    /// Writes `descriptors` for `key`, inserting when `key` is not cached.
    pub fn upsert(
        &self,
        cache: &mut DocumentCache,
        key: &str,
        descriptors: &[PropertyDescriptor],
    ) -> StoreResult<UpsertOutcome> {
        let existing_id = cache.get(key).map(|document| document.id.clone());
        let (document, outcome) = match existing_id {
            Some(document_id) => (
                self.store.update(&document_id, descriptors)?,
                UpsertOutcome::Updated,
            ),
            None => (
                self.store.insert(&self.config.collection_id, descriptors)?,
                UpsertOutcome::Inserted,
            ),
        };
        cache.insert(key, document);
        Ok(outcome)
    }

    /// Archives the record cached under `key` and drops it from the cache.
    ///
    /// Returns `false` when `key` is not cached.
    pub fn archive(&self, cache: &mut DocumentCache, key: &str) -> StoreResult<bool> {
        let document_id = match cache.get(key) {
            Some(document) => document.id.clone(),
            None => return Ok(false),
        };
        self.store.delete(&document_id)?;
        cache.remove(key);
        Ok(true)
    }
}
