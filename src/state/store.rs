//! Partial-update stores keyed by field name

use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Mapping from field name to an optional entry.
///
/// A key present with `None` is a known field whose entry is currently unset.
pub type FieldMap<T> = IndexMap<String, Option<T>>;

/// Computes the next full mapping from the current one
pub type ReplaceFn<T> = Box<dyn FnOnce(&FieldMap<T>) -> FieldMap<T>>;

/// An update dispatched to a [`MergeStore`]
pub enum Update<T> {
    /// Replace the whole mapping with the result of the function
    Replace(ReplaceFn<T>),
    /// Shallow key-wise overwrite; keys not in the partial map are kept
    Merge(FieldMap<T>),
}

impl<T> Update<T> {
    /// Build a replace update from a closure
    pub fn replace<F>(f: F) -> Self
    where
        F: FnOnce(&FieldMap<T>) -> FieldMap<T> + 'static,
    {
        Update::Replace(Box::new(f))
    }

    /// Build a merge update from any iterator of entries
    pub fn merge<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<T>)>,
        K: Into<String>,
    {
        Update::Merge(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Merge update touching a single field
    pub fn field(name: impl Into<String>, value: Option<T>) -> Self {
        let mut partial = FieldMap::with_capacity(1);
        partial.insert(name.into(), value);
        Update::Merge(partial)
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(_) => f.write_str("Replace(<fn>)"),
            Update::Merge(partial) => f.debug_tuple("Merge").field(partial).finish(),
        }
    }
}

/// Holds one field mapping and applies [`Update`]s to it.
///
/// The current mapping is an immutable snapshot; each `apply` swaps in a new
/// one so previously read snapshots never change.
pub struct MergeStore<T> {
    current: Rc<FieldMap<T>>,
}

impl<T: Clone> MergeStore<T> {
    pub fn new() -> Self {
        Self::with_entries(FieldMap::new())
    }

    pub fn with_entries(entries: FieldMap<T>) -> Self {
        Self {
            current: Rc::new(entries),
        }
    }

    /// Current mapping
    pub fn current(&self) -> Rc<FieldMap<T>> {
        Rc::clone(&self.current)
    }

    /// Apply an update and make the result the current mapping
    pub fn apply(&mut self, update: Update<T>) {
        let next = Self::resolve(&self.current, update);
        self.replace_current(next);
    }

    /// Compute the mapping `update` produces from `current` without storing it
    pub fn resolve(current: &FieldMap<T>, update: Update<T>) -> FieldMap<T> {
        match update {
            Update::Replace(f) => f(current),
            Update::Merge(partial) => {
                let mut next = current.clone();
                // IndexMap::insert keeps the position of existing keys
                for (name, value) in partial {
                    next.insert(name, value);
                }
                next
            }
        }
    }

    pub fn replace_current(&mut self, next: FieldMap<T>) {
        self.current = Rc::new(next);
    }

    /// Names of every field present in the store, in insertion order
    pub fn field_names(&self) -> Vec<String> {
        self.current.keys().cloned().collect()
    }
}

impl<T: Clone> Default for MergeStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for MergeStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeStore")
            .field("current", &self.current)
            .finish()
    }
}
