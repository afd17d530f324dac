//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into cache-aware use cases.
//! - Keep driving programs decoupled from codec and transport details.

pub mod cache;
pub mod collection_sync;
pub mod mutator;
