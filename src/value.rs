// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A converted argument value, as stored in a [Namespace](crate::Namespace).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No value (an absent argument without a default).
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// A filesystem path.
    Path(PathBuf),
    /// An ordered sequence (multi-value arities, append actions).
    List(Vec<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    /// Returns `true` for [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string, if this is a [Value::Str].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is a [Value::Int].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The number, if this is a [Value::Float] or a [Value::Int].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The boolean, if this is a [Value::Bool].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The path, if this is a [Value::Path] or a [Value::Str].
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            Value::Str(s) => Some(Path::new(s)),
            _ => None,
        }
    }

    /// The elements, if this is a [Value::List].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Order two values of compatible kinds. Integers and floats compare
    /// numerically; values of unrelated kinds are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Path(a), Value::Path(b)) => Some(a.cmp(b)),
            (a, b) => match (a, b) {
                (Value::Float(_), _) | (_, Value::Float(_)) => {
                    a.as_float()?.partial_cmp(&b.as_float()?)
                }
                _ => None,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(l) => {
                let items: Vec<String> = l.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Value::Path(p)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        #[derive(Debug)]
        struct TestData<'a> {
            value: Value,
            display: &'a str,
        }

        let tests = &[
            TestData {
                value: Value::Null,
                display: "null",
            },
            TestData {
                value: Value::from(true),
                display: "true",
            },
            TestData {
                value: Value::from(-7),
                display: "-7",
            },
            TestData {
                value: Value::from(2.5),
                display: "2.5",
            },
            TestData {
                value: Value::from("hello world"),
                display: "hello world",
            },
            TestData {
                value: Value::from(PathBuf::from("/tmp/x")),
                display: "/tmp/x",
            },
            TestData {
                value: Value::from(vec!["a", "b"]),
                display: "[a, b]",
            },
            TestData {
                value: Value::List(vec![]),
                display: "[]",
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let value = d.value.to_string();

            let msg = format!("test[{}]: {:?}, value: {:?}", i, d, value);

            assert_eq!(value, d.display, "{}", msg);
        }
    }

    #[test]
    fn test_value_compare() {
        assert_eq!(Value::from(1).compare(&Value::from(2)), Some(Ordering::Less));
        assert_eq!(
            Value::from(3).compare(&Value::from(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::from("b").compare(&Value::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::from("1").compare(&Value::from(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(3).as_int(), Some(3));
        assert_eq!(Value::from(3).as_float(), Some(3.0));
        assert_eq!(Value::from(false).as_bool(), Some(false));
        assert_eq!(Value::from("a/b").as_path(), Some(Path::new("a/b")));
        assert_eq!(
            Value::from(vec![1, 2]).as_list(),
            Some(&[Value::Int(1), Value::Int(2)][..])
        );
        assert!(Value::from(None::<i64>).is_null());
        assert!(Value::default().is_null());
    }

    #[test]
    fn test_value_serialize() {
        let value = Value::List(vec![
            Value::Null,
            Value::from(true),
            Value::from(1),
            Value::from("s"),
            Value::from(PathBuf::from("p")),
        ]);

        let json = serde_json::to_string(&value).unwrap();

        assert_eq!(json, r#"[null,true,1,"s","p"]"#);
    }
}
