//! Record store layer over the remote transport.
//!
//! # Responsibility
//! - Define use-case oriented remote record operations.
//! - Isolate transport details from service orchestration.
//!
//! # Invariants
//! - Store APIs return codec and transport errors unchanged.
//! - No retries are performed at this layer.

pub mod record_store;
