//! Initial-value cache backing field resets

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How the cache treats a second `set` for a field it already knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialValuePolicy {
    /// The first recorded value is kept for the lifetime of the field name
    #[default]
    FirstWriteWins,
    /// Every `set` replaces the recorded value, so reset follows the latest one
    Overwrite,
}

/// Remembers, per field name, the value a reset returns the field to
#[derive(Debug, Clone)]
pub struct InitialValues<V> {
    entries: IndexMap<String, V>,
    policy: InitialValuePolicy,
}

impl<V: Clone> InitialValues<V> {
    pub fn new() -> Self {
        Self::with_policy(InitialValuePolicy::default())
    }

    pub fn with_policy(policy: InitialValuePolicy) -> Self {
        Self {
            entries: IndexMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> InitialValuePolicy {
        self.policy
    }

    /// Recorded initial value, or `None` if the field was never recorded
    pub fn get(&self, name: &str) -> Option<V> {
        self.entries.get(name).cloned()
    }

    /// Record `value` as the initial value for `name`.
    ///
    /// Returns `true` if the cache changed.
    pub fn set(&mut self, name: impl Into<String>, value: V) -> bool {
        let name = name.into();
        match self.policy {
            InitialValuePolicy::FirstWriteWins if self.entries.contains_key(&name) => {
                tracing::trace!(field = %name, "initial value already recorded, keeping first");
                false
            }
            _ => {
                self.entries.insert(name, value);
                true
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for InitialValues<V> {
    fn default() -> Self {
        Self::new()
    }
}
