//! Domain model for the task-tracking state layer.
//!
//! # Responsibility
//! - Define the records owned by each store (todos, categories, profile).
//! - Provide fixed palettes and seed data used when no prior state exists.
//!
//! # Invariants
//! - Records reference each other by identifier only, never by embedding.
//! - Timestamps are Unix epoch milliseconds.

pub mod category;
pub mod profile;
pub mod seed;
pub mod todo;

use std::time::{SystemTime, UNIX_EPOCH};

/// One day in epoch milliseconds.
pub const DAY_MS: i64 = 86_400_000;

/// Returns current wall-clock time in Unix epoch milliseconds.
///
/// Clamps to `0` if the system clock reports a time before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Generates a fresh opaque record identifier.
///
/// Random v4 UUIDs are never reissued, so ids of deleted records are not reused.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
