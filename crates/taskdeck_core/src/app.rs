//! Application root owning storage, persistence and every store.
//!
//! # Responsibility
//! - Rehydrate each slice once, before any store is reachable.
//! - Wire `CategoryStore` to `TodoStore` through `CategoryTodos`.
//! - Own the persistence writer for the lifetime of the stores.
//!
//! # Invariants
//! - A missing or undecodable record falls back to that store's seed data.
//! - Dropping the context drains pending writes.

use crate::config::AppConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::category::Category;
use crate::model::now_epoch_ms;
use crate::model::profile::UserProfile;
use crate::model::seed::{default_categories, default_profile, default_todos};
use crate::model::todo::Todo;
use crate::persist::{PersistError, PersistStats, Persister};
use crate::repo::memory_repo::MemoryStateRepository;
use crate::repo::state_repo::{SqliteStateRepository, StateRepository, StorageKey};
use crate::store::auth_store::AuthSnapshot;
use crate::store::theme_store::ThemeSnapshot;
use crate::store::{
    AuthState, AuthStore, CategoryStore, CategoryTodos, ProfileStore, ThemeStore, TodoStore,
    DEMO_PIN,
};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Instant;

/// Startup failure.
#[derive(Debug)]
pub enum AppError {
    Db(DbError),
    Persist(PersistError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<PersistError> for AppError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

/// Where each rehydrated slice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOrigin {
    Stored,
    Seeded,
}

/// Rehydration outcome per storage key, in `StorageKey::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RehydrationReport {
    pub slices: Vec<(StorageKey, SliceOrigin)>,
}

impl RehydrationReport {
    pub fn origin(&self, key: StorageKey) -> Option<SliceOrigin> {
        self.slices
            .iter()
            .find(|(slice_key, _)| *slice_key == key)
            .map(|(_, origin)| *origin)
    }
}

struct Rehydrated {
    todos: Vec<Todo>,
    categories: Vec<Category>,
    profile: UserProfile,
    auth: AuthState,
    dark_mode: bool,
    report: RehydrationReport,
}

/// Owns the whole state layer. Construct one per process (or per test).
///
/// Field order matters: stores drop before the persister, which then drains.
pub struct AppContext {
    todos: Rc<TodoStore>,
    categories: CategoryStore,
    profile: ProfileStore,
    auth: AuthStore,
    theme: ThemeStore,
    report: RehydrationReport,
    persister: Persister,
}

impl AppContext {
    /// Opens the configured SQLite database and rehydrates every store.
    pub fn open(config: &AppConfig) -> Result<Self, AppError> {
        let conn = open_db(&config.db_path)?;
        Self::with_repository(SqliteStateRepository::new(conn), config.pin.as_str())
    }

    /// Context over a fresh in-memory SQLite database with the demo PIN.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = open_db_in_memory()?;
        Self::with_repository(SqliteStateRepository::new(conn), DEMO_PIN)
    }

    /// Context over a shared in-memory repository with the demo PIN.
    pub fn with_memory(repo: MemoryStateRepository) -> Result<Self, AppError> {
        Self::with_repository(repo, DEMO_PIN)
    }

    /// Rehydrates from `repo`, then hands it to the persistence writer.
    pub fn with_repository(
        repo: impl StateRepository + 'static,
        pin: &str,
    ) -> Result<Self, AppError> {
        let started_at = Instant::now();
        let state = rehydrate(&repo);
        let persister = Persister::spawn(Box::new(repo))?;

        let todos = Rc::new(TodoStore::new(state.todos, persister.handle()));
        let cascade: Rc<dyn CategoryTodos> = todos.clone();
        let categories = CategoryStore::new(state.categories, cascade, persister.handle());
        let profile = ProfileStore::new(state.profile, persister.handle());
        let auth = AuthStore::new(state.auth, pin, persister.handle());
        let theme = ThemeStore::new(state.dark_mode, persister.handle());

        info!(
            "event=app_rehydrate module=app status=ok duration_ms={} todos={} categories={}",
            started_at.elapsed().as_millis(),
            todos.len(),
            categories.len()
        );

        Ok(Self {
            todos,
            categories,
            profile,
            auth,
            theme,
            report: state.report,
            persister,
        })
    }

    pub fn todos(&self) -> &TodoStore {
        &self.todos
    }

    /// Shared handle to the todo store for collaborators that outlive a borrow.
    pub fn todo_handle(&self) -> Rc<TodoStore> {
        Rc::clone(&self.todos)
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn rehydration_report(&self) -> &RehydrationReport {
        &self.report
    }

    /// Blocks until all scheduled writes are stored.
    ///
    /// Returns the first persistence failure since the previous flush.
    pub fn flush(&self) -> Result<(), PersistError> {
        self.persister.flush()
    }

    pub fn persist_stats(&self) -> PersistStats {
        self.persister.stats()
    }
}

fn rehydrate(repo: &dyn StateRepository) -> Rehydrated {
    let mut slices = Vec::with_capacity(StorageKey::ALL.len());

    let (todos, origin) = load_slice(repo, StorageKey::Todos, || default_todos(now_epoch_ms()));
    slices.push((StorageKey::Todos, origin));
    let (categories, origin) = load_slice(repo, StorageKey::Categories, default_categories);
    slices.push((StorageKey::Categories, origin));
    let (profile, origin) = load_slice(repo, StorageKey::Profile, default_profile);
    slices.push((StorageKey::Profile, origin));
    let (auth, origin) = load_slice(repo, StorageKey::Auth, AuthSnapshot::default);
    slices.push((StorageKey::Auth, origin));
    let (theme, origin) = load_slice(repo, StorageKey::Theme, ThemeSnapshot::default);
    slices.push((StorageKey::Theme, origin));

    Rehydrated {
        todos,
        categories,
        profile,
        auth: AuthState::from(auth),
        dark_mode: theme.is_dark_mode,
        report: RehydrationReport { slices },
    }
}

fn load_slice<T: DeserializeOwned>(
    repo: &dyn StateRepository,
    key: StorageKey,
    seed: impl FnOnce() -> T,
) -> (T, SliceOrigin) {
    let raw = match repo.load_record(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!(
                "event=slice_rehydrate module=app status=seeded key={} reason=missing",
                key
            );
            return (seed(), SliceOrigin::Seeded);
        }
        Err(err) => {
            warn!(
                "event=slice_rehydrate module=app status=seeded key={} reason=load_failed error={}",
                key, err
            );
            return (seed(), SliceOrigin::Seeded);
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            info!(
                "event=slice_rehydrate module=app status=ok key={} bytes={}",
                key,
                raw.len()
            );
            (value, SliceOrigin::Stored)
        }
        Err(err) => {
            warn!(
                "event=slice_rehydrate module=app status=seeded key={} reason=decode_failed error={}",
                key, err
            );
            (seed(), SliceOrigin::Seeded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppContext, SliceOrigin};
    use crate::repo::memory_repo::MemoryStateRepository;
    use crate::repo::state_repo::{StateRepository, StorageKey};

    #[test]
    fn empty_storage_seeds_every_slice() {
        let ctx = AppContext::with_memory(MemoryStateRepository::new()).unwrap();
        for key in StorageKey::ALL {
            assert_eq!(ctx.rehydration_report().origin(key), Some(SliceOrigin::Seeded));
        }
        assert_eq!(ctx.todos().len(), 5);
        assert_eq!(ctx.categories().len(), 5);
        assert!(!ctx.auth().is_authenticated());
        assert!(!ctx.theme().is_dark_mode());
    }

    #[test]
    fn corrupt_record_falls_back_to_seed_and_keeps_others() {
        let mut repo = MemoryStateRepository::new();
        repo.save_record(StorageKey::Categories, "{not json").unwrap();
        repo.save_record(StorageKey::Theme, r#"{"isDarkMode":true}"#).unwrap();

        let ctx = AppContext::with_memory(repo).unwrap();
        let report = ctx.rehydration_report();
        assert_eq!(report.origin(StorageKey::Categories), Some(SliceOrigin::Seeded));
        assert_eq!(report.origin(StorageKey::Theme), Some(SliceOrigin::Stored));
        assert_eq!(ctx.categories().len(), 5);
        assert!(ctx.theme().is_dark_mode());
    }

    #[test]
    fn rehydration_does_not_write_back() {
        let repo = MemoryStateRepository::new();
        let ctx = AppContext::with_memory(repo.clone()).unwrap();
        ctx.flush().unwrap();
        assert!(repo.is_empty());
        assert_eq!(ctx.persist_stats().writes_applied, 0);
    }
}
