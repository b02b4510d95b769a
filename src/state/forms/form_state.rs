//! Form container: owns the field stores, the initial-value cache and the
//! control handle for one form instance

use super::controls::Controls;
use super::listener::{CallbackListener, FormListener};
use crate::config::FormConfig;
use crate::error::Result;
use crate::state::notify::{Subscribers, Subscription};
use crate::state::{FieldMap, InitialValues, MergeStore, Snapshot, Update};
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// State shared between a [`FormState`] and its [`Controls`]
pub(crate) struct Shared<V, E> {
    id: Uuid,
    values: RefCell<MergeStore<V>>,
    touched: RefCell<MergeStore<bool>>,
    validity: RefCell<MergeStore<bool>>,
    errors: RefCell<MergeStore<E>>,
    initial_values: RefCell<InitialValues<V>>,
    listener: RefCell<Rc<dyn FormListener>>,
    subscribers: Rc<Subscribers<V, E>>,
    batch_notifications: bool,
    batch_depth: Cell<usize>,
    pending: Cell<bool>,
}

impl<V: Clone + 'static, E: Clone + 'static> Shared<V, E> {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn snapshot(&self) -> Snapshot<V, E> {
        Snapshot {
            values: self.values.borrow().current(),
            touched: self.touched.borrow().current(),
            validity: self.validity.borrow().current(),
            errors: self.errors.borrow().current(),
        }
    }

    pub(crate) fn field_names(&self) -> Vec<String> {
        self.values.borrow().field_names()
    }

    pub(crate) fn initial_value(&self, name: &str) -> Option<V> {
        self.initial_values.borrow().get(name)
    }

    pub(crate) fn listener(&self) -> Rc<dyn FormListener> {
        Rc::clone(&self.listener.borrow())
    }

    pub(crate) fn dispatch_values(&self, update: Update<V>) {
        Self::apply(&self.values, update);
        self.changed();
    }

    pub(crate) fn dispatch_touched(&self, update: Update<bool>) {
        Self::apply(&self.touched, update);
        self.changed();
    }

    pub(crate) fn dispatch_validity(&self, update: Update<bool>) {
        Self::apply(&self.validity, update);
        self.changed();
    }

    pub(crate) fn dispatch_errors(&self, update: Update<E>) {
        Self::apply(&self.errors, update);
        self.changed();
    }

    // The closure of a `Replace` update runs with no store borrowed, so it may
    // read the form
    fn apply<T: Clone>(store: &RefCell<MergeStore<T>>, update: Update<T>) {
        let current = store.borrow().current();
        let next = MergeStore::resolve(&current, update);
        store.borrow_mut().replace_current(next);
    }

    /// Defer notifications until the returned guard (and any outer one) drops
    pub(crate) fn begin_batch(&self) -> BatchGuard<'_, V, E> {
        self.batch_depth.set(self.batch_depth.get() + 1);
        BatchGuard { shared: self }
    }

    fn changed(&self) {
        if self.batch_notifications && self.batch_depth.get() > 0 {
            self.pending.set(true);
        } else {
            self.notify();
        }
    }

    fn end_batch(&self) {
        let depth = self.batch_depth.get().saturating_sub(1);
        self.batch_depth.set(depth);
        // A subscriber panicking while we unwind would abort the process
        if depth == 0 && self.pending.replace(false) && !std::thread::panicking() {
            self.notify();
        }
    }

    fn notify(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers.notify(&snapshot);
    }
}

/// Ends a batch on drop
pub(crate) struct BatchGuard<'a, V: Clone + 'static, E: Clone + 'static> {
    shared: &'a Shared<V, E>,
}

impl<V: Clone + 'static, E: Clone + 'static> Drop for BatchGuard<'_, V, E> {
    fn drop(&mut self) {
        self.shared.end_batch();
    }
}

/// Construction parameters for a [`FormState`]
pub struct FormOptions<V> {
    initial_state: IndexMap<String, V>,
    listener: Option<Rc<dyn FormListener>>,
    callbacks: CallbackListener,
    config: FormConfig,
}

impl<V> FormOptions<V> {
    pub fn new() -> Self {
        Self {
            initial_state: IndexMap::new(),
            listener: None,
            callbacks: CallbackListener::new(),
            config: FormConfig::default(),
        }
    }

    /// Seed the values store
    pub fn initial_state<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        self.initial_state
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Seed a single field of the values store
    pub fn field(mut self, name: impl Into<String>, value: V) -> Self {
        self.initial_state.insert(name.into(), value);
        self
    }

    /// Called once after `clear()` finished clearing every field
    pub fn on_clear(mut self, f: impl Fn() + 'static) -> Self {
        self.callbacks = self.callbacks.on_clear(f);
        self
    }

    /// Called once after `reset()` finished resetting every field
    pub fn on_reset(mut self, f: impl Fn() + 'static) -> Self {
        self.callbacks = self.callbacks.on_reset(f);
        self
    }

    /// Use a listener instead of the `on_clear`/`on_reset` closures
    pub fn listener(mut self, listener: impl FormListener + 'static) -> Self {
        let listener: Rc<dyn FormListener> = Rc::new(listener);
        self.listener = Some(listener);
        self
    }

    pub fn config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }
}

impl<V: DeserializeOwned> FormOptions<V> {
    /// Seed the values store from a JSON object, keeping its key order
    pub fn initial_state_json(self, json: &str) -> Result<Self> {
        let entries: IndexMap<String, V> = serde_json::from_str(json)?;
        Ok(self.initial_state(entries))
    }
}

impl<V> Default for FormOptions<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Field-level state container for one form.
///
/// Tracks a value, a touched flag, a validity flag and an error per field.
/// Validity and errors are computed elsewhere; the container only stores them.
pub struct FormState<V, E> {
    shared: Rc<Shared<V, E>>,
    controls: OnceCell<Rc<Controls<V, E>>>,
}

impl<V: Clone + 'static, E: Clone + 'static> FormState<V, E> {
    /// Empty form with default configuration and no listener
    pub fn new() -> Self {
        Self::from_options(FormOptions::new())
    }

    pub fn from_options(options: FormOptions<V>) -> Self {
        let FormOptions {
            initial_state,
            listener,
            callbacks,
            config,
        } = options;

        let listener: Rc<dyn FormListener> = match listener {
            Some(listener) => listener,
            None => Rc::new(callbacks),
        };
        let values: FieldMap<V> = initial_state
            .into_iter()
            .map(|(name, value)| (name, Some(value)))
            .collect();

        let id = Uuid::new_v4();
        tracing::debug!(
            form_id = %id,
            fields = values.len(),
            policy = ?config.initial_value_policy,
            batch_notifications = config.batch_notifications,
            "form state created"
        );

        Self {
            shared: Rc::new(Shared {
                id,
                values: RefCell::new(MergeStore::with_entries(values)),
                touched: RefCell::new(MergeStore::new()),
                validity: RefCell::new(MergeStore::new()),
                errors: RefCell::new(MergeStore::new()),
                initial_values: RefCell::new(InitialValues::with_policy(
                    config.initial_value_policy,
                )),
                listener: RefCell::new(listener),
                subscribers: Subscribers::new(),
                batch_notifications: config.batch_notifications,
                batch_depth: Cell::new(0),
                pending: Cell::new(false),
            }),
            controls: OnceCell::new(),
        }
    }

    /// Unique id of this form instance, used in log output
    pub fn id(&self) -> Uuid {
        self.shared.id()
    }

    /// Latest state of all four stores
    pub fn current(&self) -> Snapshot<V, E> {
        self.shared.snapshot()
    }

    /// Control handle; the same `Rc` is returned for the form's whole lifetime
    pub fn controls(&self) -> Rc<Controls<V, E>> {
        Rc::clone(
            self.controls
                .get_or_init(|| Rc::new(Controls::new(Rc::clone(&self.shared)))),
        )
    }

    /// Dispatch directly to the values store
    pub fn set_values(&self, update: Update<V>) {
        self.shared.dispatch_values(update);
    }

    pub fn set_touched(&self, update: Update<bool>) {
        self.shared.dispatch_touched(update);
    }

    pub fn set_validity(&self, update: Update<bool>) {
        self.shared.dispatch_validity(update);
    }

    pub fn set_errors(&self, update: Update<E>) {
        self.shared.dispatch_errors(update);
    }

    /// Record the value `name` returns to on reset. Returns `true` if recorded.
    pub fn record_initial_value(&self, name: impl Into<String>, value: V) -> bool {
        self.shared.initial_values.borrow_mut().set(name, value)
    }

    pub fn initial_value(&self, name: &str) -> Option<V> {
        self.shared.initial_value(name)
    }

    /// Replace the listener; existing control handles use it from now on
    pub fn set_listener(&self, listener: impl FormListener + 'static) {
        let listener: Rc<dyn FormListener> = Rc::new(listener);
        *self.shared.listener.borrow_mut() = listener;
    }

    /// Get notified with a fresh snapshot after every change
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Snapshot<V, E>) + 'static,
    {
        self.shared.subscribers.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }

    /// Run `f` with notifications deferred; subscribers see one update at the end
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.shared.begin_batch();
        f()
    }
}

impl<V: Clone + 'static, E: Clone + 'static> Default for FormState<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> fmt::Debug for FormState<V, E>
where
    V: Clone + fmt::Debug + 'static,
    E: Clone + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("id", &self.shared.id())
            .field("state", &self.shared.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InitialValuePolicy;
    use crate::test_support::init_tracing;
    use serde_json::{json, Value};

    type JsonForm = FormState<Value, String>;

    mod construction {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_new_form_is_empty() {
            init_tracing();
            let form = JsonForm::new();
            let snap = form.current();
            assert!(snap.values.is_empty());
            assert!(snap.touched.is_empty());
            assert!(snap.validity.is_empty());
            assert!(snap.errors.is_empty());
        }

        #[test]
        fn test_initial_state_seeds_values_only() {
            let form = JsonForm::from_options(
                FormOptions::new().initial_state([("name", json!("Alice")), ("age", json!(30))]),
            );
            let snap = form.current();
            assert_eq!(snap.value("name"), Some(&json!("Alice")));
            assert_eq!(snap.value("age"), Some(&json!(30)));
            assert!(snap.touched.is_empty());
            assert!(form.initial_value("name").is_none());
        }

        #[test]
        fn test_initial_state_json_keeps_key_order() -> anyhow::Result<()> {
            let form = JsonForm::from_options(
                FormOptions::new().initial_state_json(r#"{"zeta": 1, "alpha": "a"}"#)?,
            );
            let snap = form.current();
            assert_eq!(snap.field_names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
            Ok(())
        }

        #[test]
        fn test_initial_state_json_rejects_non_object() {
            let result = FormOptions::<Value>::new().initial_state_json("[1, 2]");
            assert!(result.is_err());
        }

        #[test]
        fn test_forms_do_not_share_state() {
            let a = JsonForm::new();
            let b = JsonForm::new();
            a.controls().set_field("name", json!("Alice"));

            assert!(b.current().values.is_empty());
            assert_ne!(a.id(), b.id());
        }

        #[test]
        fn test_debug_includes_state() {
            let form = JsonForm::from_options(FormOptions::new().field("name", json!("Alice")));
            let debug_str = format!("{:?}", form);
            assert!(debug_str.contains("FormState"));
            assert!(debug_str.contains("Alice"));
        }
    }

    mod direct_dispatch {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_set_values_merge() {
            let form = JsonForm::from_options(FormOptions::new().field("a", json!(1)));
            form.set_values(Update::field("b", Some(json!(2))));
            let snap = form.current();
            assert_eq!(snap.value("a"), Some(&json!(1)));
            assert_eq!(snap.value("b"), Some(&json!(2)));
        }

        #[test]
        fn test_set_values_replace() {
            let form = JsonForm::from_options(FormOptions::new().field("a", json!(1)));
            form.set_values(Update::replace(|_| FieldMap::new()));
            assert!(form.current().values.is_empty());
        }

        #[test]
        fn test_flag_and_error_stores_are_independent() {
            let form = JsonForm::new();
            form.set_touched(Update::field("a", Some(true)));
            form.set_validity(Update::field("a", Some(false)));
            form.set_errors(Update::field("a", Some("bad".to_string())));

            let snap = form.current();
            assert!(snap.is_touched("a"));
            assert_eq!(snap.validity("a"), Some(false));
            assert_eq!(snap.error("a"), Some(&"bad".to_string()));
            assert!(snap.values.is_empty());
        }

        #[test]
        fn test_replace_closure_can_read_form() {
            let form = Rc::new(JsonForm::from_options(
                FormOptions::new().field("a", json!(1)).field("b", json!(2)),
            ));
            let weak = Rc::downgrade(&form);
            form.set_touched(Update::replace(move |current: &FieldMap<bool>| {
                let mut next = current.clone();
                if let Some(form) = weak.upgrade() {
                    for name in form.current().field_names() {
                        next.insert(name.to_string(), Some(true));
                    }
                }
                next
            }));

            let snap = form.current();
            assert!(snap.is_touched("a"));
            assert!(snap.is_touched("b"));
        }

        #[test]
        fn test_old_snapshot_survives_updates() {
            let form = JsonForm::from_options(FormOptions::new().field("a", json!(1)));
            let before = form.current();
            form.set_values(Update::field("a", Some(json!(2))));
            assert_eq!(before.value("a"), Some(&json!(1)));
        }
    }

    mod initial_values {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_record_initial_value_first_write_wins() {
            let form = JsonForm::new();
            assert!(form.record_initial_value("name", json!("Alice")));
            assert!(!form.record_initial_value("name", json!("Bob")));
            assert_eq!(form.initial_value("name"), Some(json!("Alice")));
        }

        #[test]
        fn test_overwrite_policy_from_config() {
            let config = FormConfig {
                initial_value_policy: InitialValuePolicy::Overwrite,
                ..Default::default()
            };
            let form = JsonForm::from_options(FormOptions::new().config(config));
            form.record_initial_value("name", json!("Alice"));
            form.record_initial_value("name", json!("Bob"));
            assert_eq!(form.initial_value("name"), Some(json!("Bob")));
        }
    }

    mod subscriptions {
        use super::*;
        use pretty_assertions::assert_eq;

        fn counting(form: &JsonForm) -> (Rc<Cell<usize>>, Subscription) {
            let calls = Rc::new(Cell::new(0));
            let counter = Rc::clone(&calls);
            let subscription = form.subscribe(move |_| counter.set(counter.get() + 1));
            (calls, subscription)
        }

        #[test]
        fn test_direct_dispatch_notifies_once() {
            let form = JsonForm::new();
            let (calls, _sub) = counting(&form);
            form.set_values(Update::field("a", Some(json!(1))));
            assert_eq!(calls.get(), 1);
        }

        #[test]
        fn test_batch_coalesces_notifications() {
            let form = JsonForm::new();
            let (calls, _sub) = counting(&form);
            form.batch(|| {
                form.set_values(Update::field("a", Some(json!(1))));
                form.set_touched(Update::field("a", Some(true)));
                form.batch(|| form.set_validity(Update::field("a", Some(true))));
                assert_eq!(calls.get(), 0);
            });
            assert_eq!(calls.get(), 1);
        }

        #[test]
        fn test_empty_batch_does_not_notify() {
            let form = JsonForm::new();
            let (calls, _sub) = counting(&form);
            form.batch(|| {});
            assert_eq!(calls.get(), 0);
        }

        #[test]
        fn test_unbatched_config_notifies_per_dispatch() {
            let config = FormConfig {
                batch_notifications: false,
                ..Default::default()
            };
            let form = JsonForm::from_options(FormOptions::new().config(config));
            let (calls, _sub) = counting(&form);
            form.controls().set_field("a", json!(1));
            assert_eq!(calls.get(), 3);
        }

        #[test]
        fn test_subscriber_sees_final_snapshot() {
            let form = JsonForm::new();
            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&seen);
            let _sub = form.subscribe(move |snap: &Snapshot<Value, String>| {
                sink.borrow_mut()
                    .push((snap.value("a").cloned(), snap.is_touched("a")));
            });

            form.controls().set_field("a", json!(1));
            assert_eq!(*seen.borrow(), vec![(Some(json!(1)), true)]);
        }

        #[test]
        fn test_subscriber_can_dispatch_during_notification() {
            let form = Rc::new(JsonForm::new());
            let weak = Rc::downgrade(&form);
            let _sub = form.subscribe(move |snap: &Snapshot<Value, String>| {
                if snap.is_touched("a") && !snap.is_touched("b") {
                    if let Some(form) = weak.upgrade() {
                        form.controls().set_field("b", json!(2));
                    }
                }
            });

            form.controls().set_field("a", json!(1));
            assert_eq!(form.current().value("b"), Some(&json!(2)));
        }

        #[test]
        fn test_dropping_subscription_stops_notifications() {
            let form = JsonForm::new();
            let (calls, sub) = counting(&form);
            assert_eq!(form.subscriber_count(), 1);
            drop(sub);
            form.set_values(Update::field("a", Some(json!(1))));
            assert_eq!(calls.get(), 0);
            assert_eq!(form.subscriber_count(), 0);
        }
    }
}
