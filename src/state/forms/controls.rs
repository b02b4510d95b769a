//! Field-level and form-level control operations

use super::form_state::Shared;
use crate::state::Update;
use std::fmt;
use std::rc::Rc;

/// Mutation handle for a form.
///
/// Obtained from [`FormState::controls`](super::FormState::controls), which
/// hands out the same `Rc` for the form's whole lifetime. Every operation
/// runs as one batch: subscribers see its combined result once.
pub struct Controls<V, E> {
    shared: Rc<Shared<V, E>>,
}

impl<V: Clone + 'static, E: Clone + 'static> Controls<V, E> {
    pub(crate) fn new(shared: Rc<Shared<V, E>>) -> Self {
        tracing::trace!(form_id = %shared.id(), "controls created");
        Self { shared }
    }

    /// Write all four stores for one field. `None` leaves the entry unset.
    pub fn set_field_state(
        &self,
        name: impl Into<String>,
        value: Option<V>,
        validity: Option<bool>,
        touched: Option<bool>,
        error: Option<E>,
    ) {
        let name = name.into();
        tracing::trace!(form_id = %self.shared.id(), field = %name, "set field state");
        let _batch = self.shared.begin_batch();
        self.shared.dispatch_values(Update::field(name.clone(), value));
        self.shared.dispatch_touched(Update::field(name.clone(), touched));
        self.shared.dispatch_validity(Update::field(name.clone(), validity));
        self.shared.dispatch_errors(Update::field(name, error));
    }

    /// Store a user-entered value and mark the field touched and valid.
    ///
    /// The field's error entry is left as it was.
    pub fn set_field(&self, name: impl Into<String>, value: V) {
        let name = name.into();
        tracing::trace!(form_id = %self.shared.id(), field = %name, "set field");
        let _batch = self.shared.begin_batch();
        self.shared.dispatch_values(Update::field(name.clone(), Some(value)));
        self.shared.dispatch_touched(Update::field(name.clone(), Some(true)));
        self.shared.dispatch_validity(Update::field(name, Some(true)));
    }

    /// Mark the field invalid and store `error`; value and touched are untouched
    pub fn set_field_error(&self, name: impl Into<String>, error: impl Into<Option<E>>) {
        let name = name.into();
        tracing::trace!(form_id = %self.shared.id(), field = %name, "set field error");
        let _batch = self.shared.begin_batch();
        self.shared.dispatch_validity(Update::field(name.clone(), Some(false)));
        self.shared.dispatch_errors(Update::field(name, error.into()));
    }

    /// Unset value, touched, validity and error for the field
    pub fn clear_field(&self, name: impl Into<String>) {
        self.set_field_state(name, None, None, None, None);
    }

    /// Restore the recorded initial value and unset the flags and error.
    ///
    /// A field with no recorded initial value ends up unset.
    pub fn reset_field(&self, name: impl Into<String>) {
        let name = name.into();
        let initial = self.shared.initial_value(&name);
        self.set_field_state(name, initial, None, None, None);
    }

    /// Clear every field in the values store, then notify the listener
    pub fn clear(&self) {
        let _batch = self.shared.begin_batch();
        let names = self.shared.field_names();
        tracing::debug!(form_id = %self.shared.id(), fields = names.len(), "clearing form");
        for name in names {
            self.clear_field(name);
        }
        self.shared.listener().on_clear();
    }

    /// Reset every field in the values store, then notify the listener
    pub fn reset(&self) {
        let _batch = self.shared.begin_batch();
        let names = self.shared.field_names();
        tracing::debug!(form_id = %self.shared.id(), fields = names.len(), "resetting form");
        for name in names {
            self.reset_field(name);
        }
        self.shared.listener().on_reset();
    }
}

impl<V, E> fmt::Debug for Controls<V, E>
where
    V: Clone + 'static,
    E: Clone + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controls")
            .field("form_id", &self.shared.id())
            .finish()
    }
}
