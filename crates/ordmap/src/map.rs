//! Insertion-ordered, string-keyed map
//!
//! [`OrderedMap`] is a thin semantic layer over an `IndexMap` held behind a
//! copy-on-write `Arc`. Keys are unique; iteration, extraction, and
//! serialization all observe the order in which keys were first inserted.
//!
//! Cloning a map copies only the top-level binding table (a refcount bump).
//! Nested arrays and maps stay shared between the clone and the source until
//! one side mutates, at which point the mutating side gets a private copy.
//! Adding or removing a key on one side never affects the other.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// String-keyed map preserving key insertion order.
///
/// All mutators return `&mut Self` so calls chain:
///
/// ```
/// use ordmap::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.set("a", 1).set("b", 2).erase("a");
/// assert_eq!(map.get_keys(), vec!["b".to_string()]);
/// ```
#[derive(Clone, Default)]
pub struct OrderedMap(Arc<IndexMap<String, Value>>);

impl OrderedMap {
    /// Create an empty map.
    pub fn new() -> Self {
        OrderedMap(Arc::new(IndexMap::new()))
    }

    /// Create an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap(Arc::new(IndexMap::with_capacity(capacity)))
    }

    /// Mutable access to the entry table. Triggers CoW if shared.
    fn entries_mut(&mut self) -> &mut IndexMap<String, Value> {
        Arc::make_mut(&mut self.0)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or overwrite the entry for `key`.
    ///
    /// A new key is appended; an existing key keeps its position and gets
    /// the new value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries_mut().insert(key.into(), value.into());
        self
    }

    /// Remove the entry for `key`. A no-op when the key is absent.
    ///
    /// Removal never perturbs the order of the remaining entries.
    pub fn erase(&mut self, key: &str) -> &mut Self {
        self.entries_mut().shift_remove(key);
        self
    }

    /// Remove all entries.
    pub fn empty(&mut self) -> &mut Self {
        self.entries_mut().clear();
        self
    }

    /// Insert `value` at `key` only if the key is not already present.
    ///
    /// An existing value is left untouched. This is the insert-if-absent
    /// counterpart to [`set`](Self::set)'s unconditional overwrite.
    pub fn include(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        if !self.0.contains_key(&key) {
            self.entries_mut().insert(key, value.into());
        }
        self
    }

    /// Overwrite merge: for every entry in `other`, the incoming value wins.
    ///
    /// Keys new to the receiver are appended in the order `other` introduces
    /// them; existing keys keep their position and take the new value.
    pub fn extend(&mut self, other: &OrderedMap) -> &mut Self {
        let entries = self.entries_mut();
        for (key, value) in other.iter() {
            entries.insert(key.clone(), value.clone());
        }
        self
    }

    /// Preserve merge: entries from `other` are inserted only for keys the
    /// receiver does not already hold. Existing values win.
    ///
    /// This is [`include`](Self::include) applied across an entire source.
    pub fn combine(&mut self, other: &OrderedMap) -> &mut Self {
        let entries = self.entries_mut();
        for (key, value) in other.iter() {
            if !entries.contains_key(key) {
                entries.insert(key.clone(), value.clone());
            }
        }
        self
    }

    /// Value at `key`, or `None` when absent. Never panics.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Mutable value at `key`. Triggers CoW if the map is shared.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries_mut().get_mut(key)
    }

    /// Slot for `key`, inserting `default` when vacant. Triggers CoW.
    pub(crate) fn entry_or_insert(&mut self, key: String, default: Value) -> &mut Value {
        self.entries_mut().entry(key).or_insert(default)
    }

    /// Whether `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether any entry's value structurally equals `value`.
    pub fn has_value(&self, value: &Value) -> bool {
        self.0.values().any(|v| v == value)
    }

    /// Alias for [`has_value`](Self::has_value).
    pub fn contains(&self, value: &Value) -> bool {
        self.has_value(value)
    }

    /// First key (in insertion order) whose value equals `value`.
    ///
    /// Duplicate values resolve to the earliest-inserted key.
    pub fn key_of(&self, value: &Value) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(k, _)| k.as_str())
    }

    /// Alias for [`key_of`](Self::key_of).
    pub fn index_of(&self, value: &Value) -> Option<&str> {
        self.key_of(value)
    }

    /// Ordered snapshot of the keys. A fresh list each call; later map
    /// mutation does not alter an already-returned list.
    pub fn get_keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Ordered snapshot of the values.
    pub fn get_values(&self) -> Vec<Value> {
        self.0.values().cloned().collect()
    }

    /// The plain underlying key-value table, for interop with code that
    /// expects the primitive shape rather than the container.
    pub fn get_clean(&self) -> IndexMap<String, Value> {
        (*self.0).clone()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Invoke `f(value, key)` for every entry, in insertion order, for side
    /// effects only.
    ///
    /// Traversal borrows the map, so the borrow checker already rules out
    /// mutating it from inside `f`.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&Value, &str),
    {
        for (key, value) in self.0.iter() {
            f(value, key);
        }
    }

    /// New map with the same keys, each value replaced by `f(value, key)`.
    /// The receiver is untouched.
    pub fn map<T, F>(&self, mut f: F) -> OrderedMap
    where
        T: Into<Value>,
        F: FnMut(&Value, &str) -> T,
    {
        let mut out = IndexMap::with_capacity(self.len());
        for (key, value) in self.0.iter() {
            out.insert(key.clone(), f(value, key).into());
        }
        OrderedMap(Arc::new(out))
    }

    /// New map holding only the entries for which `f(value, key)` is true,
    /// in their original relative order. The receiver is untouched.
    pub fn filter<F>(&self, mut f: F) -> OrderedMap
    where
        F: FnMut(&Value, &str) -> bool,
    {
        let mut out = IndexMap::new();
        for (key, value) in self.0.iter() {
            if f(value, key) {
                out.insert(key.clone(), value.clone());
            }
        }
        OrderedMap(Arc::new(out))
    }

    /// True iff `f(value, key)` holds for every entry. Vacuously true on an
    /// empty map.
    pub fn every<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&Value, &str) -> bool,
    {
        self.0.iter().all(|(key, value)| f(value, key))
    }

    /// True iff `f(value, key)` holds for at least one entry. False on an
    /// empty map.
    pub fn some<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&Value, &str) -> bool,
    {
        self.0.iter().any(|(key, value)| f(value, key))
    }
}

impl PartialEq for OrderedMap {
    /// Structural, order-sensitive equality: same keys, same order,
    /// deep-equal values. (`IndexMap`'s own `==` ignores order.)
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for OrderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for OrderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        f.write_str("}")
    }
}

impl std::ops::Index<&str> for OrderedMap {
    type Output = Value;

    /// Panics when the key is absent; use [`get`](OrderedMap::get) for the
    /// non-panicking lookup.
    fn index(&self, key: &str) -> &Value {
        self.0.get(key).expect("no entry found for key")
    }
}

impl From<IndexMap<String, Value>> for OrderedMap {
    fn from(entries: IndexMap<String, Value>) -> Self {
        OrderedMap(Arc::new(entries))
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for OrderedMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let entries = self.entries_mut();
        for (key, value) in iter {
            entries.insert(key.into(), value.into());
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        Extend::extend(&mut map, iter);
        map
    }
}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for OrderedMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    /// Consumes the map; clones the table only when other handles share it.
    fn into_iter(self) -> Self::IntoIter {
        Arc::try_unwrap(self.0)
            .unwrap_or_else(|shared| (*shared).clone())
            .into_iter()
    }
}
