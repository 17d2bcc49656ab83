//! Todo filtering and summary counters.

use crate::model::category::Category;
use crate::model::todo::Todo;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Completion-state selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" | "open" | "incomplete" => Some(Self::Active),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn accepts(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

/// Combined todo filter; unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub status: StatusFilter,
    pub category_id: Option<String>,
    /// Case-insensitive substring over title and description.
    pub text: Option<String>,
}

impl TodoFilter {
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn matching(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Returns matching todos in collection order.
    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        let needle = self
            .text
            .as_deref()
            .map(normalize_search_text)
            .filter(|needle| !needle.is_empty());

        todos
            .iter()
            .filter(|todo| self.status.accepts(todo))
            .filter(|todo| {
                self.category_id
                    .as_deref()
                    .map_or(true, |category_id| todo.category_id == category_id)
            })
            .filter(|todo| {
                needle.as_deref().map_or(true, |needle| {
                    matches_text(&todo.title, needle) || matches_text(&todo.description, needle)
                })
            })
            .collect()
    }
}

/// Completion counters over a todo collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

impl TodoStats {
    pub fn from_todos(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|todo| todo.completed).count();
        Self {
            total: todos.len(),
            completed,
            active: todos.len() - completed,
        }
    }
}

/// Splits todos into `(incomplete, completed)`, each in collection order.
pub fn split_by_completion(todos: &[Todo]) -> (Vec<&Todo>, Vec<&Todo>) {
    todos.iter().partition(|todo| !todo.completed)
}

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize_search_text(value: &str) -> String {
    WHITESPACE_RE
        .replace_all(value.trim(), " ")
        .to_lowercase()
}

/// Returns whether `haystack` contains an already-normalized `needle`.
pub fn matches_text(haystack: &str, needle: &str) -> bool {
    normalize_search_text(haystack).contains(needle)
}

/// Returns categories whose name contains `term`, case-insensitively.
///
/// An empty term matches every category.
pub fn filter_categories<'a>(categories: &'a [Category], term: &str) -> Vec<&'a Category> {
    let needle = normalize_search_text(term);
    categories
        .iter()
        .filter(|category| needle.is_empty() || matches_text(&category.name, &needle))
        .collect()
}
