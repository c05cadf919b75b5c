//! Execution context key/value bag
//!
//! Each job and step execution owns exactly one [`ExecutionContext`]. It is
//! the channel a step uses to persist resumable position state across
//! restarts; nothing else reads or writes it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key/value state bag carried by an execution record
///
/// Values are arbitrary JSON. Equality compares the key/value pairs only,
/// regardless of insertion order; the dirty flag is bookkeeping for the
/// repository and takes no part in equality or serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    values: HashMap<String, Value>,
    #[serde(skip)]
    dirty: bool,
}

impl ExecutionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, replacing any previous value
    pub fn put(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.values.insert(key.into(), value);
        self.dirty = true;
        self
    }

    /// Fetch the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Remove and return the value stored under `key`
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Whether the context holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate over the stored keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Whether the context changed since the dirty flag was last cleared
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, typically after the context was persisted
    pub fn clear_dirty_flag(&mut self) {
        self.dirty = false;
    }
}

impl PartialEq for ExecutionContext {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
