//! Subscriber registry for snapshot change notifications

use super::snapshot::Snapshot;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<V, E> = Rc<dyn Fn(&Snapshot<V, E>)>;

/// Callbacks notified with the latest snapshot, in registration order
pub(crate) struct Subscribers<V, E> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback<V, E>)>>,
}

impl<V: 'static, E: 'static> Subscribers<V, E> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn subscribe<F>(self: &Rc<Self>, callback: F) -> Subscription
    where
        F: Fn(&Snapshot<V, E>) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, Rc::new(callback)));

        let registry: Weak<Self> = Rc::downgrade(self);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(id);
                }
            })),
        }
    }

    fn remove(&self, id: u64) {
        self.entries.borrow_mut().retain(|(entry_id, _)| *entry_id != id);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub(crate) fn notify(&self, snapshot: &Snapshot<V, E>) {
        // Callbacks may subscribe or unsubscribe while we iterate
        let callbacks: Vec<Callback<V, E>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        tracing::trace!(subscribers = callbacks.len(), "notifying subscribers");
        for callback in callbacks {
            callback(snapshot);
        }
    }
}

/// Keeps a subscription alive; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now instead of at drop
    pub fn cancel(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
