//! Single-record profile store.

use crate::model::profile::{ProfilePatch, UserProfile};
use crate::model::seed::default_profile;
use crate::observe::{SubscriptionId, Subscribers};
use crate::persist::PersistHandle;
use crate::repo::state_repo::StorageKey;
use log::info;
use std::cell::RefCell;

/// Owner of the user profile. A profile always exists; it is never deleted.
pub struct ProfileStore {
    profile: RefCell<UserProfile>,
    persist: PersistHandle,
    subscribers: Subscribers<UserProfile>,
}

impl ProfileStore {
    pub fn new(profile: UserProfile, persist: PersistHandle) -> Self {
        Self {
            profile: RefCell::new(profile),
            persist,
            subscribers: Subscribers::new(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        self.profile.borrow().clone()
    }

    /// Shallow-merges supplied fields; omitted fields keep prior values.
    pub fn update_profile(&self, patch: &ProfilePatch) {
        let merged = patch.merged_into(&self.profile.borrow());
        self.replace(merged, "profile_update");
    }

    /// Restores the default profile record.
    pub fn reset_profile(&self) {
        self.replace(default_profile(), "profile_reset");
    }

    pub fn subscribe(&self, callback: impl Fn(&UserProfile) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn replace(&self, next: UserProfile, event: &str) {
        if *self.profile.borrow() == next {
            info!("event={} module=profile_store status=ok changed=false", event);
            return;
        }
        *self.profile.borrow_mut() = next.clone();
        self.persist.schedule(StorageKey::Profile, &next);
        self.subscribers.publish(&next);
        info!("event={} module=profile_store status=ok changed=true", event);
    }
}
