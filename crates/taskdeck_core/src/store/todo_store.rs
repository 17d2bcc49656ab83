//! Todo collection store.
//!
//! # Invariants
//! - Collection order is newest-first; `add_todo` prepends.
//! - `id` and `created_at` never change after creation.
//! - Every changing command persists the entire collection.

use crate::model::todo::{NewTodo, Todo, TodoPatch};
use crate::model::{new_record_id, now_epoch_ms};
use crate::observe::{SubscriptionId, Subscribers};
use crate::persist::PersistHandle;
use crate::repo::state_repo::StorageKey;
use crate::search::{split_by_completion, TodoFilter, TodoStats};
use log::{debug, info};
use std::cell::RefCell;

/// Capability `CategoryStore` holds into the todo collection.
///
/// Kept narrow so the category side can cascade and count, nothing else.
pub trait CategoryTodos {
    /// Removes every todo in `category_id`; returns how many were removed.
    fn delete_todos_by_category(&self, category_id: &str) -> usize;
    /// Number of todos currently in `category_id`.
    fn count_todos_in_category(&self, category_id: &str) -> usize;
}

/// Sole owner of the todo collection.
pub struct TodoStore {
    todos: RefCell<Vec<Todo>>,
    persist: PersistHandle,
    subscribers: Subscribers<[Todo]>,
}

impl TodoStore {
    /// Creates a store over an already rehydrated collection.
    pub fn new(todos: Vec<Todo>, persist: PersistHandle) -> Self {
        Self {
            todos: RefCell::new(todos),
            persist,
            subscribers: Subscribers::new(),
        }
    }

    /// Creates a todo with a fresh id, `created_at = now` and `completed = false`.
    ///
    /// The new record is placed first. Title emptiness is not checked.
    pub fn add_todo(&self, input: NewTodo) -> Todo {
        let todo = input.into_todo(new_record_id(), now_epoch_ms());
        let inserted = todo.clone();
        self.commit(move |todos| {
            todos.insert(0, inserted);
            true
        });
        info!(
            "event=todo_add module=todo_store status=ok todo_id={} category_id={}",
            todo.id, todo.category_id
        );
        todo
    }

    /// Replaces the supplied fields of todo `id`.
    ///
    /// Returns `false` (and changes nothing) when `id` does not exist.
    pub fn update_todo(&self, id: &str, patch: &TodoPatch) -> bool {
        let mut found = false;
        let changed = self.commit(|todos| {
            let Some(todo) = todos.iter_mut().find(|todo| todo.id == id) else {
                return false;
            };
            found = true;
            let before = todo.clone();
            patch.apply_to(todo);
            *todo != before
        });
        log_outcome("todo_update", id, found, changed);
        found
    }

    /// Removes todo `id`; returns whether it existed.
    pub fn delete_todo(&self, id: &str) -> bool {
        let removed = self.commit(|todos| {
            let before = todos.len();
            todos.retain(|todo| todo.id != id);
            todos.len() != before
        });
        log_outcome("todo_delete", id, removed, removed);
        removed
    }

    /// Flips `completed` on todo `id`; returns whether it existed.
    ///
    /// Two consecutive toggles restore the original value.
    pub fn toggle_todo(&self, id: &str) -> bool {
        let toggled = self.commit(|todos| match todos.iter_mut().find(|todo| todo.id == id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                true
            }
            None => false,
        });
        log_outcome("todo_toggle", id, toggled, toggled);
        toggled
    }

    /// Removes every todo whose `category_id` matches.
    ///
    /// Safe with zero matches; returns the number removed.
    pub fn delete_todos_by_category(&self, category_id: &str) -> usize {
        let mut removed = 0;
        self.commit(|todos| {
            let before = todos.len();
            todos.retain(|todo| todo.category_id != category_id);
            removed = before - todos.len();
            removed > 0
        });
        info!(
            "event=todo_delete_by_category module=todo_store status=ok category_id={} removed={}",
            category_id, removed
        );
        removed
    }

    /// Snapshot of the whole collection in store order.
    pub fn todos(&self) -> Vec<Todo> {
        self.todos.borrow().clone()
    }

    /// Runs `f` over the collection without cloning it.
    pub fn with_todos<R>(&self, f: impl FnOnce(&[Todo]) -> R) -> R {
        f(&self.todos.borrow())
    }

    pub fn len(&self) -> usize {
        self.todos.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.borrow().is_empty()
    }

    pub fn get_todo_by_id(&self, id: &str) -> Option<Todo> {
        self.todos
            .borrow()
            .iter()
            .find(|todo| todo.id == id)
            .cloned()
    }

    /// Todos in `category_id`, preserving collection order.
    pub fn get_todos_by_category(&self, category_id: &str) -> Vec<Todo> {
        self.todos
            .borrow()
            .iter()
            .filter(|todo| todo.category_id == category_id)
            .cloned()
            .collect()
    }

    pub fn filter_todos(&self, filter: &TodoFilter) -> Vec<Todo> {
        self.with_todos(|todos| filter.apply(todos).into_iter().cloned().collect())
    }

    pub fn stats(&self) -> TodoStats {
        self.with_todos(TodoStats::from_todos)
    }

    /// Returns `(incomplete, completed)`, each in collection order.
    pub fn split_by_completion(&self) -> (Vec<Todo>, Vec<Todo>) {
        self.with_todos(|todos| {
            let (open, done) = split_by_completion(todos);
            (
                open.into_iter().cloned().collect(),
                done.into_iter().cloned().collect(),
            )
        })
    }

    /// Registers `callback` to receive the collection after every change.
    pub fn subscribe(&self, callback: impl Fn(&[Todo]) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Applies `mutate`; when it reports a change, persists and publishes.
    ///
    /// The borrow is released before subscribers run, so callbacks may query.
    fn commit(&self, mutate: impl FnOnce(&mut Vec<Todo>) -> bool) -> bool {
        let snapshot = {
            let mut todos = self.todos.borrow_mut();
            if !mutate(&mut todos) {
                return false;
            }
            todos.clone()
        };
        self.persist.schedule(StorageKey::Todos, &snapshot);
        self.subscribers.publish(&snapshot);
        true
    }
}

impl CategoryTodos for TodoStore {
    fn delete_todos_by_category(&self, category_id: &str) -> usize {
        TodoStore::delete_todos_by_category(self, category_id)
    }

    fn count_todos_in_category(&self, category_id: &str) -> usize {
        self.todos
            .borrow()
            .iter()
            .filter(|todo| todo.category_id == category_id)
            .count()
    }
}

fn log_outcome(event: &str, id: &str, found: bool, changed: bool) {
    if found {
        info!(
            "event={} module=todo_store status=ok todo_id={} changed={}",
            event, id, changed
        );
    } else {
        debug!(
            "event={} module=todo_store status=noop todo_id={} reason=not_found",
            event, id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryTodos, TodoStore};
    use crate::model::seed::default_todos;
    use crate::model::todo::{NewTodo, TodoPatch};
    use crate::persist::Persister;
    use crate::repo::memory_repo::MemoryStateRepository;
    use crate::repo::state_repo::StorageKey;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store_with_seed() -> (TodoStore, Persister, MemoryStateRepository) {
        let repo = MemoryStateRepository::new();
        let persister = Persister::spawn(Box::new(repo.clone())).unwrap();
        let store = TodoStore::new(default_todos(1_000), persister.handle());
        (store, persister, repo)
    }

    #[test]
    fn add_prepends_and_persists() {
        let (store, persister, repo) = store_with_seed();
        let created = store.add_todo(NewTodo::new("Call mom", "personal"));

        assert_eq!(store.todos()[0].id, created.id);
        assert!(!created.completed);
        persister.flush().unwrap();
        let stored = repo.snapshot(StorageKey::Todos).expect("todos persisted");
        assert!(stored.contains(&created.id));
    }

    #[test]
    fn update_with_unknown_id_does_not_publish() {
        let (store, persister, repo) = store_with_seed();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        let patch = TodoPatch {
            title: Some("ghost".to_string()),
            ..TodoPatch::default()
        };
        assert!(!store.update_todo("missing", &patch));
        assert!(!store.delete_todo("missing"));
        assert!(!store.toggle_todo("missing"));
        assert_eq!(store.delete_todos_by_category("missing"), 0);

        persister.flush().unwrap();
        assert_eq!(*hits.borrow(), 0);
        assert!(repo.snapshot(StorageKey::Todos).is_none());
    }

    #[test]
    fn subscribers_can_query_during_publish() {
        let (store, _persister, _repo) = store_with_seed();
        let store = Rc::new(store);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner_store = Rc::clone(&store);
        let inner_seen = Rc::clone(&seen);
        store.subscribe(move |todos| {
            inner_seen
                .borrow_mut()
                .push((todos.len(), inner_store.stats().completed));
        });

        store.toggle_todo("1");
        assert_eq!(*seen.borrow(), vec![(5, 2)]);
    }

    #[test]
    fn category_handle_counts_and_cascades() {
        let (store, _persister, _repo) = store_with_seed();
        store.add_todo(NewTodo::new("Standup notes", "work"));

        let handle: &dyn CategoryTodos = &store;
        assert_eq!(handle.count_todos_in_category("work"), 2);
        assert_eq!(handle.delete_todos_by_category("work"), 2);
        assert_eq!(handle.count_todos_in_category("work"), 0);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn split_by_completion_preserves_order() {
        let (store, _persister, _repo) = store_with_seed();
        let (open, done) = store.split_by_completion();
        let open_ids = open.iter().map(|todo| todo.id.as_str()).collect::<Vec<_>>();
        assert_eq!(open_ids, vec!["1", "3", "4", "5"]);
        assert_eq!(done.len(), 1);
    }
}
