//! Core adapter between flat application records and a type-tagged remote
//! document store.
//! This crate owns the property codec and the read-modify-write protocol.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod transport;

pub use codec::{decode, encode, encode_all, CodecError, CodecResult};
pub use config::{ConfigError, SyncConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::document::{Document, DocumentId, PropertyMap};
pub use model::property::{PropertyDescriptor, PropertyType, PropertyValue};
pub use repo::record_store::{DocumentBatches, RecordStore, StoreError, StoreResult};
pub use service::cache::DocumentCache;
pub use service::collection_sync::{CollectionSync, UpsertOutcome};
pub use service::mutator::set_property;
pub use transport::{
    DocumentPage, DocumentPatch, DocumentTransport, MemoryTransport, TransportError,
    TransportResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
