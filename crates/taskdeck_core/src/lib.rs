//! Core state layer for the taskdeck task tracker.
//! This crate is the single source of truth for todo/category invariants.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod observe;
pub mod persist;
pub mod repo;
pub mod search;
pub mod store;

pub use app::{AppContext, AppError, RehydrationReport, SliceOrigin};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryColor, CategoryId};
pub use model::profile::{ProfilePatch, TagColor, UserProfile};
pub use model::todo::{NewTodo, RepeatConfig, Todo, TodoId, TodoPatch, Weekday};
pub use observe::SubscriptionId;
pub use persist::{PersistError, PersistStats};
pub use repo::memory_repo::MemoryStateRepository;
pub use repo::state_repo::{RepoError, SqliteStateRepository, StateRepository, StorageKey};
pub use search::{StatusFilter, TodoFilter, TodoStats};
pub use store::{
    AuthState, AuthStore, CategoryStore, CategoryTodos, ProfileStore, ThemeStore, TodoStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
