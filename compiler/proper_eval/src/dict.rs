//! Insertion-ordered, string-keyed map.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::Value;

/// String-keyed mapping that preserves insertion order.
///
/// Overwriting a key keeps its original position and replaces the value,
/// matching dict semantics of the configuration syntax.
#[derive(Clone, Default)]
pub struct Dict {
    entries: Vec<(String, Value)>,
    index: FxHashMap<String, usize>,
}

impl Dict {
    pub fn new() -> Self {
        Dict::default()
    }

    /// Insert or overwrite; returns the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(&slot) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert every entry of `other`, later entries winning.
    pub fn extend_from(&mut self, other: &Dict) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}

impl IntoIterator for Dict {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Equality ignores insertion order.
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for Dict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overwrite_keeps_position() {
        let mut dict = Dict::new();
        dict.insert("a", Value::Int(1));
        dict.insert("b", Value::Int(2));
        let previous = dict.insert("a", Value::Int(3));
        assert_eq!(previous, Some(Value::Int(1)));
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(dict.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_equality_ignores_order() {
        let left: Dict = [("a", Value::Int(1)), ("b", Value::Int(2))].into_iter().collect();
        let right: Dict = [("b", Value::Int(2)), ("a", Value::Int(1))].into_iter().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_extend_from_later_wins() {
        let mut base: Dict = [("a", Value::Int(1)), ("b", Value::Int(2))].into_iter().collect();
        let over: Dict = [("b", Value::Int(5)), ("c", Value::Int(6))].into_iter().collect();
        base.extend_from(&over);
        let expected: Dict = [("a", Value::Int(1)), ("b", Value::Int(5)), ("c", Value::Int(6))]
            .into_iter()
            .collect();
        assert_eq!(base, expected);
    }
}
