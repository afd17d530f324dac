//! Record store operations over a remote document transport.
//!
//! # Responsibility
//! - Provide insert/update/archive/read APIs built from the property codec.
//! - Keep remote call details behind `DocumentTransport`.
//!
//! # Invariants
//! - Every write encodes all descriptors into one field mapping per call.
//! - Delete never removes a record; it sets the archival flag.
//! - Reads are lazy and yield one page per item.

use crate::codec::{encode_all, CodecError};
use crate::model::document::Document;
use crate::model::property::PropertyDescriptor;
use crate::transport::{DocumentPatch, DocumentTransport, TransportError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by record store and mutation operations.
#[derive(Debug)]
pub enum StoreError {
    Codec(CodecError),
    Transport(TransportError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codec(err) => write!(f, "{err}"),
            Self::Transport(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Transport(err) => Some(err),
        }
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<TransportError> for StoreError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

/// Remote collection access through one transport.
pub struct RecordStore<T: DocumentTransport> {
    transport: T,
}

impl<T: DocumentTransport> RecordStore<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Creates one document in `collection_id` from `descriptors`.
    pub fn insert(
        &self,
        collection_id: &str,
        descriptors: &[PropertyDescriptor],
    ) -> StoreResult<Document> {
        let started_at = Instant::now();
        let properties = encode_all(descriptors);
        match self.transport.create_document(collection_id, properties) {
            Ok(document) => {
                info!(
                    "event=record_insert module=store status=ok collection={} document={} fields={} duration_ms={}",
                    collection_id,
                    document.id,
                    descriptors.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(document)
            }
            Err(err) => {
                error!(
                    "event=record_insert module=store status=error collection={} duration_ms={} error={}",
                    collection_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Writes `descriptors` to `document_id` unconditionally.
    ///
    /// Unlike `set_property`, there is no skip-if-unchanged check.
    pub fn update(
        &self,
        document_id: &str,
        descriptors: &[PropertyDescriptor],
    ) -> StoreResult<Document> {
        let patch = DocumentPatch::properties(encode_all(descriptors));
        self.patch("record_update", document_id, &patch)
    }

    /// Archives `document_id`. The record stays in the remote store.
    pub fn delete(&self, document_id: &str) -> StoreResult<Document> {
        self.patch("record_archive", document_id, &DocumentPatch::archive())
    }

    /// Returns a lazy sequence of document pages for `collection_id`.
    ///
    /// Each call starts a fresh listing from the first page.
    pub fn read<'s>(&'s self, collection_id: &'s str) -> DocumentBatches<'s, T> {
        DocumentBatches {
            transport: &self.transport,
            collection_id,
            cursor: None,
            finished: false,
        }
    }

    fn patch(
        &self,
        event: &str,
        document_id: &str,
        patch: &DocumentPatch,
    ) -> StoreResult<Document> {
        let started_at = Instant::now();
        match self.transport.update_document(document_id, patch) {
            Ok(document) => {
                info!(
                    "event={} module=store status=ok document={} duration_ms={}",
                    event,
                    document_id,
                    started_at.elapsed().as_millis()
                );
                Ok(document)
            }
            Err(err) => {
                error!(
                    "event={} module=store status=error document={} duration_ms={} error={}",
                    event,
                    document_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

/// Lazy page iterator over a collection listing.
///
/// Ends after the last page or after the first error.
pub struct DocumentBatches<'s, T: DocumentTransport> {
    transport: &'s T,
    collection_id: &'s str,
    cursor: Option<String>,
    finished: bool,
}

impl<T: DocumentTransport> Iterator for DocumentBatches<'_, T> {
    type Item = StoreResult<Vec<Document>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let page = match self
            .transport
            .query_page(self.collection_id, self.cursor.as_deref())
        {
            Ok(page) => page,
            Err(err) => {
                self.finished = true;
                error!(
                    "event=record_read module=store status=error collection={} error={}",
                    self.collection_id, err
                );
                return Some(Err(err.into()));
            }
        };

        match (page.has_more, page.next_cursor) {
            (true, Some(cursor)) => self.cursor = Some(cursor),
            _ => self.finished = true,
        }
        info!(
            "event=record_read module=store status=ok collection={} batch_size={} has_more={}",
            self.collection_id,
            page.results.len(),
            !self.finished
        );
        Some(Ok(page.results))
    }
}
