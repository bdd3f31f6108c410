//! Local mirror of the device datastore.
//!
//! The datastore maps slash-separated paths (`"mix/chan/1/fader"`) to
//! dynamically typed values. The watcher is the only writer; typed reads may
//! happen concurrently from any task, so the map sits behind a `RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::DeviceError;
use crate::value::Value;

/// A single changed datastore entry, as delivered on the event channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Datastore path, e.g. `"mix/chan/1/fader"`.
    pub path: String,
    /// The value the path now holds.
    pub value: Value,
}

/// In-memory path-to-value cache mirroring the device datastore.
///
/// Thread-safe via internal RwLock. Written only by the watcher after a
/// successful fetch; any number of concurrent readers may use the typed
/// getters while the watcher runs.
#[derive(Debug, Default)]
pub struct Datastore {
    values: RwLock<HashMap<String, Value>>,
}

impl Datastore {
    /// Creates an empty datastore.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a value, replacing any previous entry for the path.
    pub(crate) fn insert(&self, path: &str, value: Value) {
        let mut values = self.values.write().unwrap();
        values.insert(path.to_string(), value);
    }

    /// Returns a copy of the value at `path`, if any.
    pub fn get(&self, path: &str) -> Option<Value> {
        let values = self.values.read().unwrap();
        values.get(path).cloned()
    }

    /// Reads a float value.
    pub fn float(&self, path: &str) -> Result<f64, DeviceError> {
        match self.get(path) {
            Some(value) => value
                .as_float()
                .ok_or_else(|| mismatch(path, "float", value.type_name())),
            None => Err(mismatch(path, "float", "nothing")),
        }
    }

    /// Reads an integer value.
    pub fn int(&self, path: &str) -> Result<i64, DeviceError> {
        match self.get(path) {
            Some(value) => value
                .as_int()
                .ok_or_else(|| mismatch(path, "int", value.type_name())),
            None => Err(mismatch(path, "int", "nothing")),
        }
    }

    /// Reads a boolean value. The device stores booleans as 0/1 numbers.
    pub fn bool(&self, path: &str) -> Result<bool, DeviceError> {
        match self.get(path) {
            Some(value) => value
                .as_bool()
                .ok_or_else(|| mismatch(path, "bool", value.type_name())),
            None => Err(mismatch(path, "bool", "nothing")),
        }
    }

    /// Reads a string value.
    pub fn text(&self, path: &str) -> Result<String, DeviceError> {
        match self.get(path) {
            Some(Value::Text(v)) => Ok(v),
            Some(value) => Err(mismatch(path, "text", value.type_name())),
            None => Err(mismatch(path, "text", "nothing")),
        }
    }

    /// Number of mirrored paths.
    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    /// True until the first snapshot has been merged.
    pub fn is_empty(&self) -> bool {
        self.values.read().unwrap().is_empty()
    }

    /// Returns all mirrored paths, in no particular order.
    pub fn paths(&self) -> Vec<String> {
        self.values.read().unwrap().keys().cloned().collect()
    }
}

fn mismatch(path: &str, expected: &'static str, found: &'static str) -> DeviceError {
    DeviceError::TypeMismatch {
        path: path.to_string(),
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let store = Datastore::new();
        assert!(store.is_empty());

        store.insert("mix/1/fader", Value::Float(0.75));
        assert_eq!(store.get("mix/1/fader"), Some(Value::Float(0.75)));
        assert_eq!(store.len(), 1);

        store.insert("mix/1/fader", Value::Float(0.5));
        assert_eq!(store.get("mix/1/fader"), Some(Value::Float(0.5)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_typed_getters() {
        let store = Datastore::new();
        store.insert("mix/1/fader", Value::Float(0.75));
        store.insert("mix/1/mute", Value::Float(1.0));
        store.insert("mix/1/name", Value::Text("Vocals".to_string()));
        store.insert("mix/1/eq/band", Value::Int(3));

        assert_eq!(store.float("mix/1/fader").unwrap(), 0.75);
        assert!(store.bool("mix/1/mute").unwrap());
        assert_eq!(store.text("mix/1/name").unwrap(), "Vocals");
        assert_eq!(store.int("mix/1/eq/band").unwrap(), 3);
        // wire numbers are one type: int widens on a float read
        assert_eq!(store.float("mix/1/eq/band").unwrap(), 3.0);
    }

    #[test]
    fn test_type_mismatch() {
        let store = Datastore::new();
        store.insert("mix/1/name", Value::Text("Vocals".to_string()));

        let err = store.float("mix/1/name").unwrap_err();
        assert!(matches!(
            err,
            DeviceError::TypeMismatch {
                expected: "float",
                found: "text",
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "cannot read mix/1/name as float: found text"
        );
    }

    #[test]
    fn test_missing_path_is_a_mismatch() {
        let store = Datastore::new();
        let err = store.bool("mix/9/mute").unwrap_err();
        assert!(matches!(
            err,
            DeviceError::TypeMismatch {
                expected: "bool",
                found: "nothing",
                ..
            }
        ));
    }

    #[test]
    fn test_paths() {
        let store = Datastore::new();
        store.insert("a", Value::Int(1));
        store.insert("b", Value::Int(2));

        let mut paths = store.paths();
        paths.sort();
        assert_eq!(paths, vec!["a".to_string(), "b".to_string()]);
    }
}
