//! Domain model for the remote document store adapter.
//!
//! # Responsibility
//! - Define the property type taxonomy and flat caller-facing values.
//! - Define the document snapshot shape returned by the remote store.
//!
//! # Invariants
//! - Every document is identified by a stable remote id.
//! - Deletion is represented by the archival flag, not removal.

pub mod document;
pub mod property;
