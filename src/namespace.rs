// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::value::Value;

/// The result of a parse: destination key to [Value].
///
/// Every declared destination has an entry (its default if the argument
/// was not given) unless the argument suppresses its default.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Namespace {
    #[serde(flatten)]
    attrs: BTreeMap<String, Value>,

    /// Keys set by a parsed token rather than by a default.
    #[serde(skip)]
    explicit: HashSet<String>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Namespace::default()
    }

    /// Store a value, marking the key as explicitly set.
    pub fn set<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        let key = key.into();

        self.explicit.insert(key.clone());
        self.attrs.insert(key, value.into());
    }

    /// Store a default value. An explicit value is never overwritten.
    pub(crate) fn set_default(&mut self, key: &str, value: Value) {
        if self.explicit.contains(key) {
            return;
        }

        self.attrs.insert(key.into(), value);
    }

    /// Remove and return the value for the key.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.explicit.remove(key);
        self.attrs.remove(key)
    }

    /// Returns the value stored for the key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Returns the string stored for the key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns the integer stored for the key.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    /// Returns the number stored for the key.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_float)
    }

    /// Returns the boolean stored for the key.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Returns the list stored for the key.
    pub fn get_list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_list)
    }

    /// Returns the path stored for the key.
    pub fn get_path(&self, key: &str) -> Option<&Path> {
        self.get(key).and_then(Value::as_path)
    }

    /// Returns `true` if the key has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Returns `true` if the key was set by a parsed token.
    pub fn is_explicit(&self, key: &str) -> bool {
        self.explicit.contains(key)
    }

    /// Iterate over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attrs.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Bind the entries onto a typed structure by field name.
    ///
    /// # Example
    ///
    /// ```
    /// use argmatch::Namespace;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Opts {
    ///     name: String,
    ///     count: i64,
    /// }
    ///
    /// let mut ns = Namespace::new();
    /// ns.set("name", "x");
    /// ns.set("count", 2);
    ///
    /// let opts: Opts = ns.deserialize().unwrap();
    ///
    /// assert_eq!(opts.name, "x");
    /// assert_eq!(opts.count, 2);
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let json = serde_json::to_value(self).map_err(|e| Error::GenericError(e.to_string()))?;

        serde_json::from_value(json).map_err(|e| Error::GenericError(e.to_string()))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let entries: Vec<String> = self
            .attrs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        write!(f, "Namespace({})", entries.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde::Deserialize;
    use std::path::PathBuf;

    #[test]
    fn test_set_and_default() {
        let mut ns = Namespace::new();
        assert!(ns.is_empty());

        ns.set_default("level", Value::from(1));
        assert_eq!(ns.get_int("level"), Some(1));
        assert!(!ns.is_explicit("level"));

        ns.set("level", 5);
        assert!(ns.is_explicit("level"));

        // A default never replaces an explicit value.
        ns.set_default("level", Value::from(1));
        assert_eq!(ns.get_int("level"), Some(5));

        assert_eq!(ns.take("level"), Some(Value::from(5)));
        assert!(!ns.contains("level"));
        assert!(!ns.is_explicit("level"));
    }

    #[test]
    fn test_typed_getters() {
        let mut ns = Namespace::new();

        ns.set("s", "str");
        ns.set("i", 3);
        ns.set("f", 1.5);
        ns.set("b", true);
        ns.set("l", vec!["a", "b"]);
        ns.set("p", PathBuf::from("/tmp"));

        assert_eq!(ns.get_str("s"), Some("str"));
        assert_eq!(ns.get_int("i"), Some(3));
        assert_eq!(ns.get_float("f"), Some(1.5));
        assert_eq!(ns.get_bool("b"), Some(true));
        assert_eq!(ns.get_list("l").map(|l| l.len()), Some(2));
        assert_eq!(ns.get_path("p"), Some(Path::new("/tmp")));

        assert_eq!(ns.get_int("s"), None);
        assert_eq!(ns.get_str("missing"), None);
        assert_eq!(ns.len(), 6);
    }

    #[test]
    fn test_display() {
        let mut ns = Namespace::new();
        ns.set("b", vec![1, 2]);
        ns.set("a", "x");

        assert_eq!(ns.to_string(), "Namespace(a=x, b=[1, 2])");
        assert_eq!(Namespace::new().to_string(), "Namespace()");
    }

    #[test]
    fn test_serialize() {
        let mut ns = Namespace::new();
        ns.set("name", "x");
        ns.set_default("count", Value::from(0));

        let json = serde_json::to_string(&ns).unwrap();

        assert_eq!(json, r#"{"count":0,"name":"x"}"#);
    }

    #[test]
    fn test_deserialize() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Opts {
            files: Vec<String>,
            verbose: bool,
            level: Option<i64>,
        }

        let mut ns = Namespace::new();
        ns.set("files", vec!["a", "b"]);
        ns.set("verbose", false);
        ns.set("level", Value::Null);

        let opts: Opts = ns.deserialize().unwrap();

        assert_eq!(
            opts,
            Opts {
                files: vec!["a".into(), "b".into()],
                verbose: false,
                level: None,
            }
        );

        let result = ns.deserialize::<Vec<String>>();
        assert!(matches!(result, Err(Error::GenericError(_))));
    }
}
