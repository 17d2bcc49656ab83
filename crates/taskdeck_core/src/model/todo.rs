//! Todo domain model.
//!
//! # Responsibility
//! - Define the task record and the input/patch shapes used by `TodoStore`.
//! - Model weekly repeat configuration.
//!
//! # Invariants
//! - `id` is stable and never reused for another todo.
//! - `created_at` is immutable after creation; `TodoPatch` cannot touch it.
//! - A repeat day appears at most once (`BTreeSet`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque todo identifier.
pub type TodoId = String;

/// Day tag used by repeat configuration, ordered `mon..sun`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All days in display order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Stable storage tag (`mon`, `tue`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }

    /// Short display label (`Mon`, `Tue`, ...).
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }

    /// Parses a storage tag, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == normalized.as_str())
    }
}

/// Weekly repeat configuration for a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatConfig {
    pub enabled: bool,
    /// Which days the task repeats on. Set semantics: no duplicates.
    pub days: BTreeSet<Weekday>,
}

impl RepeatConfig {
    /// Creates an enabled repeat over the given days, collapsing duplicates.
    pub fn on_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            enabled: true,
            days: days.into_iter().collect(),
        }
    }

    /// Returns whether this config repeats on `day`.
    pub fn repeats_on(&self, day: Weekday) -> bool {
        self.enabled && self.days.contains(&day)
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    /// Foreign key into the category collection.
    pub category_id: String,
    pub completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatConfig>,
}

/// Caller input for `TodoStore::add_todo`.
///
/// Title emptiness is a caller contract and is not checked by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub due_date: Option<i64>,
    pub repeat: Option<RepeatConfig>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category_id: category_id.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: i64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatConfig) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Materializes the record with store-assigned identity and timestamp.
    pub(crate) fn into_todo(self, id: TodoId, created_at: i64) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            category_id: self.category_id,
            completed: false,
            created_at,
            due_date: self.due_date,
            repeat: self.repeat,
        }
    }
}

/// Partial update for `TodoStore::update_todo`.
///
/// `None` leaves a field untouched. Optional record fields use a nested
/// `Option` so callers can clear them with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<i64>>,
    pub repeat: Option<Option<RepeatConfig>>,
}

impl TodoPatch {
    /// Returns whether the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies supplied fields onto `todo`.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = description.clone();
        }
        if let Some(category_id) = &self.category_id {
            todo.category_id = category_id.clone();
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(repeat) = &self.repeat {
            todo.repeat = repeat.clone();
        }
    }
}
