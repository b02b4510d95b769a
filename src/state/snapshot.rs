//! Read-only view over the four field stores

use super::store::FieldMap;
use std::rc::Rc;

/// Latest values, touched flags, validity flags and errors of a form.
///
/// Cloning a snapshot is cheap and it never changes after it is taken.
#[derive(Debug)]
pub struct Snapshot<V, E> {
    pub values: Rc<FieldMap<V>>,
    pub touched: Rc<FieldMap<bool>>,
    pub validity: Rc<FieldMap<bool>>,
    pub errors: Rc<FieldMap<E>>,
}

/// Everything a snapshot knows about one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot<'a, V, E> {
    pub value: Option<&'a V>,
    pub touched: bool,
    pub validity: Option<bool>,
    pub error: Option<&'a E>,
}

impl<V, E> Snapshot<V, E> {
    pub fn value(&self, name: &str) -> Option<&V> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Missing and unset entries both read as not touched
    pub fn is_touched(&self, name: &str) -> bool {
        matches!(self.touched.get(name), Some(Some(true)))
    }

    /// `None` means no validity has been recorded for the field
    pub fn validity(&self, name: &str) -> Option<bool> {
        self.validity.get(name).copied().flatten()
    }

    pub fn error(&self, name: &str) -> Option<&E> {
        self.errors.get(name).and_then(Option::as_ref)
    }

    pub fn field(&self, name: &str) -> FieldSnapshot<'_, V, E> {
        FieldSnapshot {
            value: self.value(name),
            touched: self.is_touched(name),
            validity: self.validity(name),
            error: self.error(name),
        }
    }

    /// Known fields, i.e. the keys of the values store
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// True when any field carries an explicit `false` validity flag
    pub fn has_invalid_fields(&self) -> bool {
        self.validity.values().any(|v| *v == Some(false))
    }
}

// Manual impl: cloning only bumps the Rc counts, so V and E need not be Clone
impl<V, E> Clone for Snapshot<V, E> {
    fn clone(&self) -> Self {
        Self {
            values: Rc::clone(&self.values),
            touched: Rc::clone(&self.touched),
            validity: Rc::clone(&self.validity),
            errors: Rc::clone(&self.errors),
        }
    }
}
