//! The shared form-state contract and its in-memory implementation.
//!
//! Renderers never own field values. They read, write, subscribe and register
//! validation through [`FormState`], addressed by dotted [`FieldPath`]s. Row
//! arrays live at a top-level path and cells at `array.index.column`.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::debug;

use crate::path::{FieldPath, Segment};
use crate::validation::ValidationRules;

/// Path-addressed reactive store the engine renders against.
pub trait FormState {
    /// Current value at `path`; `Value::Null` when absent.
    fn get(&self, path: &FieldPath) -> Value;

    /// Writes `value` at `path`, creating intermediate containers.
    fn set(&mut self, path: &FieldPath, value: Value);

    /// Subscribes the caller to `path` and returns its current value.
    fn watch(&mut self, path: &FieldPath) -> Value;

    /// Declares the rules the store evaluates for `path`.
    fn register_validation(&mut self, path: &FieldPath, rules: ValidationRules);

    /// Error message currently reported for `path`.
    fn error(&self, path: &FieldPath) -> Option<String>;

    /// Appends one row to the array at `array`.
    fn append(&mut self, array: &FieldPath, row: Value);

    /// Removes the row at `index`; later rows shift down by one.
    fn remove(&mut self, array: &FieldPath, index: usize);

    /// Number of rows in the array at `array` (0 when it is not an array).
    fn len(&self, array: &FieldPath) -> usize {
        match self.get(array) {
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }
}

/// In-memory [`FormState`] backed by a JSON object.
#[derive(Debug, Clone, Default)]
pub struct MemoryFormState {
    values: Value,
    rules: BTreeMap<FieldPath, ValidationRules>,
    errors: BTreeMap<FieldPath, String>,
    watched: BTreeSet<FieldPath>,
    changes: Vec<FieldPath>,
    revision: u64,
}

impl MemoryFormState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Value::Object(Map::new()),
            ..Self::default()
        }
    }

    /// Starts from an existing record (e.g. a loaded entity).
    #[must_use]
    pub fn with_values(values: Value) -> Self {
        let values = match values {
            Value::Object(_) => values,
            _ => Value::Object(Map::new()),
        };
        Self {
            values,
            ..Self::default()
        }
    }

    /// Snapshot of every value, as the host would submit it.
    #[must_use]
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Evaluates every registered rule, replacing the errors of ruled paths.
    /// Returns true when no rule fails.
    pub fn validate(&mut self) -> bool {
        let mut valid = true;
        let outcomes: Vec<(FieldPath, Option<String>)> = self
            .rules
            .iter()
            .map(|(path, rules)| (path.clone(), rules.check(&lookup(&self.values, path))))
            .collect();
        for (path, outcome) in outcomes {
            match outcome {
                Some(message) => {
                    valid = false;
                    self.errors.insert(path, message);
                }
                None => {
                    self.errors.remove(&path);
                }
            }
        }
        valid
    }

    /// Injects an externally produced error (e.g. a server-side rejection).
    pub fn set_error(&mut self, path: &FieldPath, message: impl Into<String>) {
        self.errors.insert(path.clone(), message.into());
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Paths written since the last call, in write order.
    pub fn take_changes(&mut self) -> Vec<FieldPath> {
        std::mem::take(&mut self.changes)
    }

    /// Monotonic counter bumped by every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn is_watched(&self, path: &FieldPath) -> bool {
        self.watched.contains(path)
    }

    #[must_use]
    pub fn rules(&self, path: &FieldPath) -> Option<&ValidationRules> {
        self.rules.get(path)
    }

    fn touch(&mut self, path: &FieldPath) {
        self.changes.push(path.clone());
        self.revision += 1;
    }

    fn revalidate(&mut self, path: &FieldPath) {
        if !self.errors.contains_key(path) {
            return;
        }
        let Some(rules) = self.rules.get(path) else {
            return;
        };
        match rules.check(&lookup(&self.values, path)) {
            Some(message) => {
                self.errors.insert(path.clone(), message);
            }
            None => {
                self.errors.remove(path);
            }
        }
    }
}

impl FormState for MemoryFormState {
    fn get(&self, path: &FieldPath) -> Value {
        lookup(&self.values, path)
    }

    fn set(&mut self, path: &FieldPath, value: Value) {
        if let Some(slot) = slot_mut(&mut self.values, path) {
            *slot = value;
        }
        self.touch(path);
        self.revalidate(path);
    }

    fn watch(&mut self, path: &FieldPath) -> Value {
        self.watched.insert(path.clone());
        lookup(&self.values, path)
    }

    fn register_validation(&mut self, path: &FieldPath, rules: ValidationRules) {
        if rules.is_empty() {
            self.rules.remove(path);
        } else {
            self.rules.insert(path.clone(), rules);
        }
    }

    fn error(&self, path: &FieldPath) -> Option<String> {
        self.errors.get(path).cloned()
    }

    fn append(&mut self, array: &FieldPath, row: Value) {
        let Some(slot) = slot_mut(&mut self.values, array) else {
            return;
        };
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(row);
            debug!(array = %array, rows = items.len(), "row appended");
        }
        self.touch(array);
    }

    fn remove(&mut self, array: &FieldPath, index: usize) {
        if index >= self.len(array) {
            return;
        }
        let Some(Value::Array(items)) = slot_mut(&mut self.values, array) else {
            return;
        };
        items.remove(index);
        debug!(array = %array, index, rows = items.len(), "row removed");

        let name = array.as_str();
        self.errors = shift_rows(std::mem::take(&mut self.errors), name, index);
        self.rules = shift_rows(std::mem::take(&mut self.rules), name, index);
        self.watched = std::mem::take(&mut self.watched)
            .into_iter()
            .filter_map(|path| shift_path(path, name, index))
            .collect();
        self.touch(array);
    }
}

/// Drops entries of the removed row and renumbers entries of later rows.
fn shift_rows<V>(
    entries: BTreeMap<FieldPath, V>,
    array: &str,
    removed: usize,
) -> BTreeMap<FieldPath, V> {
    entries
        .into_iter()
        .filter_map(|(path, value)| shift_path(path, array, removed).map(|path| (path, value)))
        .collect()
}

fn shift_path(path: FieldPath, array: &str, removed: usize) -> Option<FieldPath> {
    match path.row_index_under(array) {
        Some(row) if row == removed => None,
        Some(row) if row > removed => Some(path.with_row_index(array, row - 1)),
        _ => Some(path),
    }
}

fn lookup(root: &Value, path: &FieldPath) -> Value {
    let mut current = root;
    for segment in path.segments() {
        let next = match segment {
            Segment::Key(key) => current.get(key),
            Segment::Index(index) => match current {
                Value::Array(items) => items.get(index),
                _ => current.get(index.to_string()),
            },
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    current.clone()
}

fn slot_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match segment {
            Segment::Key(key) => {
                if !current.is_object() {
                    *current = Value::Object(Map::new());
                }
                let Value::Object(map) = current else {
                    return None;
                };
                map.entry(key.to_owned()).or_insert(Value::Null)
            }
            Segment::Index(index) => {
                if !current.is_array() && !current.is_object() {
                    *current = Value::Array(Vec::new());
                }
                match current {
                    Value::Object(map) => map.entry(index.to_string()).or_insert(Value::Null),
                    Value::Array(items) => {
                        if items.len() <= index {
                            items.resize(index + 1, Value::Null);
                        }
                        items.get_mut(index)?
                    }
                    _ => return None,
                }
            }
        };
    }
    Some(current)
}
