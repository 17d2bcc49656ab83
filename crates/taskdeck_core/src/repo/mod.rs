//! Durable local storage for store snapshots.
//!
//! # Responsibility
//! - Define the key/value contract each store persists its slice through.
//! - Isolate SQLite details from stores and the persistence writer.
//!
//! # Invariants
//! - One record per `StorageKey`; a save replaces the whole record.
//! - Values are opaque JSON text at this layer.

pub mod memory_repo;
pub mod state_repo;
