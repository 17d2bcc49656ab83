//! Read-only derived views over store slices.
//!
//! # Responsibility
//! - Filter todos by completion status, category and free text.
//! - Match category names for the category list search box.
//!
//! # Invariants
//! - Every function here is pure: inputs are borrowed, nothing is mutated.
//! - Result order always follows the input collection order.

pub mod todo_filter;

pub use todo_filter::{
    filter_categories, matches_text, normalize_search_text, split_by_completion, StatusFilter,
    TodoFilter, TodoStats,
};
