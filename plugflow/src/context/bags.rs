//! Key/value bags carried by a [`Context`](super::Context).

use crate::errors::PluginError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A string-keyed map of heterogeneous JSON values.
///
/// Used for both the metadata and the state of a context. The bag enforces no
/// schema; typed accessors narrow values at runtime and report
/// [`PluginError::TypeMismatch`] when the stored value has the wrong shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueBag {
    entries: HashMap<String, Value>,
}

impl ValueBag {
    /// Creates a new empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bag from existing entries.
    #[must_use]
    pub fn from_map(entries: HashMap<String, Value>) -> Self {
        Self { entries }
    }

    /// Gets a value from the bag.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Gets a mutable value from the bag.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Gets a value deserialized into `T`.
    ///
    /// Returns `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::TypeMismatch`] if the value does not deserialize as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PluginError> {
        self.entries
            .get(key)
            .map(|value| narrow(key, value))
            .transpose()
    }

    /// Gets a value deserialized into `T`, failing if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingKey`] if the key is absent, or
    /// [`PluginError::TypeMismatch`] if the value does not deserialize as `T`.
    pub fn require_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, PluginError> {
        self.get_as(key)?
            .ok_or_else(|| PluginError::missing_key(key))
    }

    /// Inserts a value, returning the previous one if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Serializes `value` and inserts it, returning the previous value if any.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Serialization`] if `value` cannot be serialized.
    pub fn insert_as<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Option<Value>, PluginError> {
        let value =
            serde_json::to_value(value).map_err(|e| PluginError::Serialization(e.to_string()))?;
        Ok(self.entries.insert(key.into(), value))
    }

    /// Appends a value to the array stored under `key`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::TypeMismatch`] if the key holds a non-array value.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), PluginError> {
        let slot = self
            .entries
            .entry(key.into())
            .or_insert_with(|| Value::Array(Vec::new()));

        match slot {
            Value::Array(items) => {
                items.push(value.into());
                Ok(())
            }
            other => Err(PluginError::type_mismatch("array", value_kind(other))),
        }
    }

    /// Removes a value, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns a copy of all entries.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.entries.clone()
    }

    /// Consumes the bag, returning its entries.
    #[must_use]
    pub fn into_map(self) -> HashMap<String, Value> {
        self.entries
    }
}

impl From<HashMap<String, Value>> for ValueBag {
    fn from(entries: HashMap<String, Value>) -> Self {
        Self::from_map(entries)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Deserializes a stored value into `T`, reporting a mismatch on failure.
pub(crate) fn narrow<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T, PluginError> {
    T::deserialize(value).map_err(|e| {
        PluginError::type_mismatch(
            std::any::type_name::<T>(),
            format!("{} at '{key}' ({e})", value_kind(value)),
        )
    })
}

/// Names the JSON kind of a value.
pub(crate) const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_bag_insert_and_get() {
        let mut bag = ValueBag::new();
        assert_eq!(bag.insert("score", 0.4), None);

        assert_eq!(bag.get("score"), Some(&json!(0.4)));
        assert!(bag.contains_key("score"));
        assert!(!bag.contains_key("other"));
    }

    #[test]
    fn test_bag_insert_overwrites() {
        let mut bag = ValueBag::new();
        bag.insert("intent", "greeting");
        let previous = bag.insert("intent", "farewell");

        assert_eq!(previous, Some(json!("greeting")));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_bag_get_as() {
        let mut bag = ValueBag::new();
        bag.insert("tags", json!(["a", "b"]));

        let tags: Option<Vec<String>> = bag.get_as("tags").unwrap();
        assert_eq!(tags, Some(vec!["a".to_string(), "b".to_string()]));

        let absent: Option<u32> = bag.get_as("missing").unwrap();
        assert_eq!(absent, None);
    }

    #[test]
    fn test_bag_get_as_type_mismatch() {
        let mut bag = ValueBag::new();
        bag.insert("score", "high");

        let err = bag.get_as::<f64>("score").unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("f64"));
        assert!(err.to_string().contains("string at 'score'"));
    }

    #[test]
    fn test_bag_require_as_missing() {
        let bag = ValueBag::new();
        let err = bag.require_as::<f64>("moderation_score").unwrap_err();
        assert!(matches!(err, PluginError::MissingKey { ref key } if key == "moderation_score"));
    }

    #[test]
    fn test_bag_insert_as_struct() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Intent {
            kind: String,
            confidence: f64,
        }

        let mut bag = ValueBag::new();
        let intent = Intent {
            kind: "question".to_string(),
            confidence: 0.5,
        };
        bag.insert_as("intent", &intent).unwrap();

        let restored: Intent = bag.require_as("intent").unwrap();
        assert_eq!(restored, intent);
    }

    #[test]
    fn test_bag_push() {
        let mut bag = ValueBag::new();
        bag.push("order", 0).unwrap();
        bag.push("order", 1).unwrap();

        assert_eq!(bag.get("order"), Some(&json!([0, 1])));
    }

    #[test]
    fn test_bag_push_onto_scalar_fails() {
        let mut bag = ValueBag::new();
        bag.insert("order", 3);

        let err = bag.push("order", 4).unwrap_err();
        assert_eq!(err.to_string(), "expected array, got number");
    }

    #[test]
    fn test_bag_from_iter_and_remove() {
        let mut bag: ValueBag = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(bag.len(), 2);

        assert_eq!(bag.remove("a"), Some(json!(1)));
        assert_eq!(bag.keys(), vec!["b".to_string()]);

        bag.clear();
        assert!(bag.is_empty());
    }

    #[test]
    fn test_bag_serializes_transparently() {
        let bag: ValueBag = [("k", "v")].into_iter().collect();
        assert_eq!(serde_json::to_value(&bag).unwrap(), json!({"k": "v"}));
    }
}
