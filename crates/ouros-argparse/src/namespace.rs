use std::{fmt, ops::Index};

use indexmap::IndexMap;
use serde::Serialize;

use crate::value::Value;

/// Result of a successful parse: `dest` → value, in first-insertion order.
///
/// Seeded defaults come first in declaration order; keys only added when an
/// argument with a suppressed default is matched appear after them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Namespace {
    values: IndexMap<String, Value>,
}

impl Namespace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.values.get(dest)
    }

    #[must_use]
    pub fn contains(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    /// Sets `dest`, keeping its original position if it already existed.
    pub fn insert(&mut self, dest: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(dest.into(), value)
    }

    pub fn remove(&mut self, dest: &str) -> Option<Value> {
        self.values.shift_remove(dest)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(dest, value)| (dest.as_str(), value))
    }

    pub(crate) fn get_mut(&mut self, dest: &str) -> Option<&mut Value> {
        self.values.get_mut(dest)
    }
}

impl Index<&str> for Namespace {
    type Output = Value;

    /// # Panics
    /// Panics if `dest` is not present, like indexing a map.
    fn index(&self, dest: &str) -> &Value {
        &self.values[dest]
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Namespace(")?;
        for (idx, (dest, value)) in self.values.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{dest}={}", value.repr())?;
        }
        f.write_str(")")
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
