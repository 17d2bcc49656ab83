//! Default records used when storage holds no prior state.
//!
//! # Invariants
//! - The five default categories use the five palette colors, one each.
//! - Every default todo references a default category.

use super::category::{Category, CategoryColor};
use super::profile::{TagColor, UserProfile};
use super::todo::Todo;
use super::DAY_MS;

pub const DEFAULT_AVATAR: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=Alex";

/// Default category set in display order.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("work", "Work", CategoryColor::Work),
        Category::new("personal", "Personal", CategoryColor::Personal),
        Category::new("health", "Health", CategoryColor::Health),
        Category::new("shopping", "Shopping", CategoryColor::Shopping),
        Category::new("ideas", "Ideas", CategoryColor::Ideas),
    ]
}

/// Default profile record; `reset_profile` restores exactly this value.
pub fn default_profile() -> UserProfile {
    UserProfile {
        name: "Alex Johnson".to_string(),
        avatar: DEFAULT_AVATAR.to_string(),
        about: "Productivity enthusiast and design lover. Building beautiful things one task at a time."
            .to_string(),
        tag: "Productivity Enthusiast".to_string(),
        tag_color: TagColor::Cyan,
    }
}

/// Sample todos, timestamped relative to `now_ms`.
pub fn default_todos(now_ms: i64) -> Vec<Todo> {
    vec![
        seed_todo(
            "1",
            "Complete project proposal",
            "Finish the quarterly project proposal for the team meeting",
            "work",
            false,
            now_ms,
            Some(now_ms + 2 * DAY_MS),
        ),
        seed_todo(
            "2",
            "Morning yoga session",
            "30 minutes of stretching and meditation",
            "health",
            true,
            now_ms - DAY_MS,
            None,
        ),
        seed_todo(
            "3",
            "Buy groceries",
            "Milk, eggs, bread, fruits, vegetables",
            "shopping",
            false,
            now_ms,
            None,
        ),
        seed_todo(
            "4",
            "Plan weekend trip",
            "Research destinations and book accommodations",
            "personal",
            false,
            now_ms,
            Some(now_ms + 5 * DAY_MS),
        ),
        seed_todo(
            "5",
            "App redesign concept",
            "Sketch out new ideas for the mobile app interface",
            "ideas",
            false,
            now_ms,
            None,
        ),
    ]
}

fn seed_todo(
    id: &str,
    title: &str,
    description: &str,
    category_id: &str,
    completed: bool,
    created_at: i64,
    due_date: Option<i64>,
) -> Todo {
    Todo {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category_id: category_id.to_string(),
        completed,
        created_at,
        due_date,
        repeat: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{default_categories, default_todos};
    use crate::model::category::CategoryColor;

    #[test]
    fn default_categories_cover_the_whole_palette() {
        let colors = default_categories()
            .into_iter()
            .map(|category| category.color)
            .collect::<Vec<_>>();
        assert_eq!(colors, CategoryColor::PALETTE.to_vec());
    }

    #[test]
    fn default_todos_reference_default_categories() {
        let categories = default_categories();
        for todo in default_todos(1_000) {
            assert!(
                categories.iter().any(|category| category.id == todo.category_id),
                "todo {} points at unknown category {}",
                todo.id,
                todo.category_id
            );
        }
    }
}
