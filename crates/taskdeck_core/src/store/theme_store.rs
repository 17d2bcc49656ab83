//! Dark-mode preference store.

use crate::observe::{SubscriptionId, Subscribers};
use crate::persist::PersistHandle;
use crate::repo::state_repo::StorageKey;
use log::info;
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Persisted shape of the theme slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSnapshot {
    pub is_dark_mode: bool,
}

pub struct ThemeStore {
    dark_mode: Cell<bool>,
    persist: PersistHandle,
    subscribers: Subscribers<bool>,
}

impl ThemeStore {
    pub fn new(dark_mode: bool, persist: PersistHandle) -> Self {
        Self {
            dark_mode: Cell::new(dark_mode),
            persist,
            subscribers: Subscribers::new(),
        }
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode.get()
    }

    /// Flips the preference and returns the new value.
    pub fn toggle_dark_mode(&self) -> bool {
        let next = !self.dark_mode.get();
        self.set_dark_mode(next);
        next
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        if self.dark_mode.replace(enabled) == enabled {
            return;
        }
        self.persist.schedule(
            StorageKey::Theme,
            &ThemeSnapshot {
                is_dark_mode: enabled,
            },
        );
        self.subscribers.publish(&enabled);
        info!(
            "event=theme_set module=theme_store status=ok dark_mode={}",
            enabled
        );
    }

    pub fn subscribe(&self, callback: impl Fn(&bool) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::ThemeStore;
    use crate::persist::Persister;
    use crate::repo::memory_repo::MemoryStateRepository;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn toggle_flips_and_publishes_new_value() {
        let persister = Persister::spawn(Box::new(MemoryStateRepository::new())).unwrap();
        let store = ThemeStore::new(false, persister.handle());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |dark: &bool| sink.borrow_mut().push(*dark));

        assert!(store.toggle_dark_mode());
        assert!(!store.toggle_dark_mode());
        store.set_dark_mode(false);

        assert_eq!(*seen.borrow(), vec![true, false]);
    }
}
