//! State containers: one store per domain slice.
//!
//! # Responsibility
//! - Own each slice in memory and expose its commands and queries.
//! - Schedule a whole-slice persistence write after every changing command.
//! - Publish the new slice to subscribers after every changing command.
//!
//! # Invariants
//! - Stores are single-threaded (`!Send`); commands run to completion.
//! - Commands on unknown ids are silent no-ops: no write, no publish.
//! - `CategoryStore` depends on `TodoStore` only through `CategoryTodos`.

pub mod auth_store;
pub mod category_store;
pub mod profile_store;
pub mod theme_store;
pub mod todo_store;

pub use auth_store::{AuthState, AuthStore, DEMO_PIN};
pub use category_store::CategoryStore;
pub use profile_store::ProfileStore;
pub use theme_store::ThemeStore;
pub use todo_store::{CategoryTodos, TodoStore};
