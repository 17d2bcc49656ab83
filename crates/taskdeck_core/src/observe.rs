//! Explicit publish/subscribe for store slices.
//!
//! # Invariants
//! - Subscribers are notified in subscription order.
//! - Publishing iterates over a snapshot of the subscriber list, so callbacks
//!   may subscribe, unsubscribe or query stores without re-entrancy panics.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Single-threaded subscriber list for one slice type.
pub struct Subscribers<T: ?Sized> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Rc<dyn Fn(&T)>)>>,
}

impl<T: ?Sized> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> Subscribers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let callback: Rc<dyn Fn(&T)> = Rc::new(callback);
        self.entries.borrow_mut().push((id, callback));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn publish(&self, value: &T) {
        let callbacks = self
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect::<Vec<_>>();
        for callback in callbacks {
            callback(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Subscribers;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publish_reaches_subscribers_in_order() {
        let subscribers = Subscribers::<[u32]>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        subscribers.subscribe(move |values: &[u32]| first.borrow_mut().push(("a", values.len())));
        let second = Rc::clone(&seen);
        subscribers.subscribe(move |values: &[u32]| second.borrow_mut().push(("b", values.len())));

        subscribers.publish(&[1, 2, 3]);
        assert_eq!(*seen.borrow(), vec![("a", 3), ("b", 3)]);
    }

    #[test]
    fn unsubscribed_callbacks_stop_receiving() {
        let subscribers = Subscribers::<bool>::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let id = subscribers.subscribe(move |_| *counter.borrow_mut() += 1);

        subscribers.publish(&true);
        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.publish(&false);

        assert_eq!(*hits.borrow(), 1);
        assert!(subscribers.is_empty());
    }

    #[test]
    fn callback_may_unsubscribe_itself_during_publish() {
        let subscribers = Rc::new(Subscribers::<bool>::new());
        let slot = Rc::new(RefCell::new(None));

        let inner_subscribers = Rc::clone(&subscribers);
        let inner_slot = Rc::clone(&slot);
        let id = subscribers.subscribe(move |_| {
            if let Some(id) = inner_slot.borrow_mut().take() {
                inner_subscribers.unsubscribe(id);
            }
        });
        *slot.borrow_mut() = Some(id);

        subscribers.publish(&true);
        assert_eq!(subscribers.len(), 0);
    }
}
