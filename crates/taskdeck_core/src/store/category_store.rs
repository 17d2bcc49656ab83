//! Category store with cascade delete into the todo collection.
//!
//! # Invariants
//! - At most one category per id; fresh ids are never reissued.
//! - `delete_category` removes dependent todos before the category itself,
//!   so no todo is observed pointing at a missing category.
//! - Per-category todo counts are derived on demand, never stored.

use crate::model::category::{Category, CategoryColor};
use crate::model::new_record_id;
use crate::observe::{SubscriptionId, Subscribers};
use crate::persist::PersistHandle;
use crate::repo::state_repo::StorageKey;
use crate::search::filter_categories;
use crate::store::todo_store::CategoryTodos;
use log::{debug, info};
use std::cell::RefCell;
use std::rc::Rc;

/// Sole owner of categories.
pub struct CategoryStore {
    categories: RefCell<Vec<Category>>,
    todos: Rc<dyn CategoryTodos>,
    persist: PersistHandle,
    subscribers: Subscribers<[Category]>,
}

impl CategoryStore {
    /// Creates a store over rehydrated categories and a handle into the todos.
    pub fn new(
        categories: Vec<Category>,
        todos: Rc<dyn CategoryTodos>,
        persist: PersistHandle,
    ) -> Self {
        Self {
            categories: RefCell::new(categories),
            todos,
            persist,
            subscribers: Subscribers::new(),
        }
    }

    /// Appends a category with a fresh id and an automatically chosen color.
    pub fn add_category(&self, name: impl Into<String>) -> Category {
        let color = CategoryColor::next_available(
            self.categories
                .borrow()
                .iter()
                .map(|category| &category.color)
                .collect::<Vec<_>>(),
        );
        let category = Category::new(new_record_id(), name, color);
        let appended = category.clone();
        self.commit(move |categories| {
            categories.push(appended);
            true
        });
        info!(
            "event=category_add module=category_store status=ok category_id={} color={}",
            category.id,
            category.color.as_str()
        );
        category
    }

    /// Renames category `id`; returns whether it existed.
    pub fn update_category(&self, id: &str, name: impl Into<String>) -> bool {
        let name = name.into();
        let mut found = false;
        self.commit(|categories| {
            let Some(category) = categories.iter_mut().find(|category| category.id == id) else {
                return false;
            };
            found = true;
            if category.name == name {
                return false;
            }
            category.name = name;
            true
        });
        if found {
            info!(
                "event=category_update module=category_store status=ok category_id={}",
                id
            );
        } else {
            debug!(
                "event=category_update module=category_store status=noop category_id={} reason=not_found",
                id
            );
        }
        found
    }

    /// Deletes category `id` after cascading to its todos.
    ///
    /// The cascade always runs first, even for unknown ids, so stale todo
    /// references cannot survive. Returns whether the category existed.
    pub fn delete_category(&self, id: &str) -> bool {
        let removed_todos = self.todos.delete_todos_by_category(id);
        let removed = self.commit(|categories| {
            let before = categories.len();
            categories.retain(|category| category.id != id);
            categories.len() != before
        });
        info!(
            "event=category_delete module=category_store status={} category_id={} removed_todos={}",
            if removed { "ok" } else { "noop" },
            id,
            removed_todos
        );
        removed
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.categories.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.borrow().is_empty()
    }

    pub fn get_category_by_id(&self, id: &str) -> Option<Category> {
        self.categories
            .borrow()
            .iter()
            .find(|category| category.id == id)
            .cloned()
    }

    /// Number of todos in category `id`, read through the todo handle.
    pub fn get_category_count(&self, id: &str) -> usize {
        self.todos.count_todos_in_category(id)
    }

    /// Categories whose name contains `term`, case-insensitively.
    pub fn search_categories(&self, term: &str) -> Vec<Category> {
        filter_categories(&self.categories.borrow(), term)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn subscribe(&self, callback: impl Fn(&[Category]) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn commit(&self, mutate: impl FnOnce(&mut Vec<Category>) -> bool) -> bool {
        let snapshot = {
            let mut categories = self.categories.borrow_mut();
            if !mutate(&mut categories) {
                return false;
            }
            categories.clone()
        };
        self.persist.schedule(StorageKey::Categories, &snapshot);
        self.subscribers.publish(&snapshot);
        true
    }
}
