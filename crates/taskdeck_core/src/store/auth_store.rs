//! PIN gate for the application.
//!
//! This is a placeholder gate for a single-user demo, not a credential
//! check: the PIN is compared in plain text, there is no lockout, attempt
//! counting or session expiry, and any number of failed attempts is allowed.

use crate::observe::{SubscriptionId, Subscribers};
use crate::persist::PersistHandle;
use crate::repo::state_repo::StorageKey;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Demo PIN used when configuration supplies none.
pub const DEMO_PIN: &str = "1234";

/// Session gate state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated,
}

impl AuthState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Persisted shape of the auth slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub is_authenticated: bool,
}

impl From<AuthSnapshot> for AuthState {
    fn from(value: AuthSnapshot) -> Self {
        if value.is_authenticated {
            Self::Authenticated
        } else {
            Self::Unauthenticated
        }
    }
}

impl From<AuthState> for AuthSnapshot {
    fn from(value: AuthState) -> Self {
        Self {
            is_authenticated: value.is_authenticated(),
        }
    }
}

/// Owner of the authentication flag.
pub struct AuthStore {
    state: Cell<AuthState>,
    pin: String,
    persist: PersistHandle,
    subscribers: Subscribers<AuthState>,
}

impl AuthStore {
    pub fn new(state: AuthState, pin: impl Into<String>, persist: PersistHandle) -> Self {
        Self {
            state: Cell::new(state),
            pin: pin.into(),
            persist,
            subscribers: Subscribers::new(),
        }
    }

    /// Authenticates iff `candidate` equals the configured PIN.
    ///
    /// Failure leaves the state unchanged.
    pub fn validate_pin(&self, candidate: &str) -> bool {
        if candidate != self.pin {
            warn!("event=auth_validate module=auth_store status=rejected");
            return false;
        }
        self.transition(AuthState::Authenticated);
        info!("event=auth_validate module=auth_store status=ok");
        true
    }

    /// Returns to `Unauthenticated` regardless of the current state.
    pub fn logout(&self) {
        self.transition(AuthState::Unauthenticated);
        info!("event=auth_logout module=auth_store status=ok");
    }

    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.get().is_authenticated()
    }

    pub fn subscribe(&self, callback: impl Fn(&AuthState) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn transition(&self, next: AuthState) {
        if self.state.replace(next) == next {
            return;
        }
        self.persist.schedule(StorageKey::Auth, &AuthSnapshot::from(next));
        self.subscribers.publish(&next);
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthSnapshot, AuthState, AuthStore, DEMO_PIN};
    use crate::persist::Persister;
    use crate::repo::memory_repo::MemoryStateRepository;
    use crate::repo::state_repo::StorageKey;

    #[test]
    fn pin_scenario() {
        let repo = MemoryStateRepository::new();
        let persister = Persister::spawn(Box::new(repo.clone())).unwrap();
        let store = AuthStore::new(AuthState::Unauthenticated, DEMO_PIN, persister.handle());

        assert!(!store.validate_pin("0000"));
        assert_eq!(store.state(), AuthState::Unauthenticated);

        assert!(store.validate_pin("1234"));
        assert_eq!(store.state(), AuthState::Authenticated);

        store.logout();
        assert_eq!(store.state(), AuthState::Unauthenticated);

        persister.flush().unwrap();
        assert_eq!(
            repo.snapshot(StorageKey::Auth).as_deref(),
            Some(r#"{"isAuthenticated":false}"#)
        );
    }

    #[test]
    fn failed_attempts_are_unlimited() {
        let persister = Persister::spawn(Box::new(MemoryStateRepository::new())).unwrap();
        let store = AuthStore::new(AuthState::Unauthenticated, "9876", persister.handle());
        for _ in 0..50 {
            assert!(!store.validate_pin("0000"));
        }
        assert!(store.validate_pin("9876"));
    }

    #[test]
    fn snapshot_conversion_round_trips() {
        for state in [AuthState::Authenticated, AuthState::Unauthenticated] {
            assert_eq!(AuthState::from(AuthSnapshot::from(state)), state);
        }
    }
}
