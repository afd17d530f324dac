//! Remote transport contract.
//!
//! # Responsibility
//! - Define the calls the core needs from the remote document store.
//! - Keep authentication, retries and wire transport outside the core.
//!
//! # Invariants
//! - Every call is synchronous and returns the complete fresh document.
//! - Failures are reported as `TransportError` and never retried here.

use crate::model::document::{Document, PropertyMap};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;

pub use memory::MemoryTransport;

pub type TransportResult<T> = Result<T, TransportError>;

/// Remote call failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The addressed document or collection does not exist.
    NotFound(String),
    /// The remote store rejected the submitted body.
    Validation(String),
    /// Auth, network or any other backend failure.
    Backend(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "remote object not found: {id}"),
            Self::Validation(message) => write!(f, "remote store rejected request: {message}"),
            Self::Backend(message) => write!(f, "remote call failed: {message}"),
        }
    }
}

impl Error for TransportError {}

/// Body of an update call. Absent fields are left untouched remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl DocumentPatch {
    pub fn properties(properties: PropertyMap) -> Self {
        Self {
            properties: Some(properties),
            archived: None,
        }
    }

    pub fn archive() -> Self {
        Self {
            properties: None,
            archived: Some(true),
        }
    }
}

/// One page of a collection listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub results: Vec<Document>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Synchronous remote document store.
pub trait DocumentTransport {
    /// Creates a document in `collection_id` and returns it.
    fn create_document(
        &self,
        collection_id: &str,
        properties: PropertyMap,
    ) -> TransportResult<Document>;

    /// Applies `patch` to `document_id` and returns the fresh document.
    fn update_document(&self, document_id: &str, patch: &DocumentPatch)
        -> TransportResult<Document>;

    /// Returns the page of `collection_id` starting at `start_cursor`.
    fn query_page(
        &self,
        collection_id: &str,
        start_cursor: Option<&str>,
    ) -> TransportResult<DocumentPage>;
}

impl<T: DocumentTransport + ?Sized> DocumentTransport for &T {
    fn create_document(
        &self,
        collection_id: &str,
        properties: PropertyMap,
    ) -> TransportResult<Document> {
        (**self).create_document(collection_id, properties)
    }

    fn update_document(
        &self,
        document_id: &str,
        patch: &DocumentPatch,
    ) -> TransportResult<Document> {
        (**self).update_document(document_id, patch)
    }

    fn query_page(
        &self,
        collection_id: &str,
        start_cursor: Option<&str>,
    ) -> TransportResult<DocumentPage> {
        (**self).query_page(collection_id, start_cursor)
    }
}
