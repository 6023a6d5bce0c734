// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Type converters: raw token to [Value].

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::value::Value;

/// Why a converter rejected a token.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ConvertError {
    /// Not an integer.
    #[error("invalid integer: {0}")]
    Int(#[from] ParseIntError),

    /// Not a floating point number.
    #[error("invalid float: {0}")]
    Float(#[from] ParseFloatError),

    /// Any other reason.
    #[error("{0}")]
    Invalid(String),
}

/// Converts one raw token into a typed [Value].
///
/// Closures of type `Fn(&str) -> Result<Value, ConvertError>` are
/// converters too.
pub trait Converter: Send + Sync {
    /// Convert the token.
    fn convert(&self, raw: &str) -> Result<Value, ConvertError>;

    /// Metavar to show when the argument does not declare one
    /// (for example `{true,false}`).
    fn metavar(&self) -> Option<String> {
        None
    }
}

impl fmt::Debug for dyn Converter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Converter: {:p}", self)
    }
}

impl<F> Converter for F
where
    F: Fn(&str) -> Result<Value, ConvertError> + Send + Sync,
{
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        self(raw)
    }
}

/// Keeps the token as a string (the default).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StringType;

impl Converter for StringType {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        Ok(Value::Str(raw.into()))
    }
}

/// Parses a signed 64-bit integer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IntType;

impl Converter for IntType {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        Ok(Value::Int(raw.parse::<i64>()?))
    }
}

/// Parses a 64-bit float.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FloatType;

impl Converter for FloatType {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        Ok(Value::Float(raw.parse::<f64>()?))
    }
}

/// Accepts exactly two literals, mapped to `true` and `false`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoolType {
    true_value: String,
    false_value: String,
}

impl Default for BoolType {
    fn default() -> Self {
        BoolType::new("true", "false")
    }
}

impl BoolType {
    /// Create a converter using the specified literals.
    pub fn new(true_value: &str, false_value: &str) -> Self {
        BoolType {
            true_value: true_value.into(),
            false_value: false_value.into(),
        }
    }
}

impl Converter for BoolType {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        if raw == self.true_value {
            Ok(Value::Bool(true))
        } else if raw == self.false_value {
            Ok(Value::Bool(false))
        } else {
            Err(ConvertError::Invalid(format!(
                "choose from {}",
                self.metavar().unwrap_or_default()
            )))
        }
    }

    fn metavar(&self) -> Option<String> {
        Some(format!("{{{},{}}}", self.true_value, self.false_value))
    }
}

/// Accepts one of a fixed set of names, stored as the canonical name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnumStringType {
    names: Vec<String>,
    ignore_case: bool,
}

impl EnumStringType {
    /// Create a converter accepting the specified names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumStringType {
            names: names.into_iter().map(Into::into).collect(),
            ignore_case: false,
        }
    }

    /// Match names case-insensitively.
    pub fn ignore_case(self) -> Self {
        EnumStringType {
            ignore_case: true,
            ..self
        }
    }
}

impl Converter for EnumStringType {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        self.names
            .iter()
            .find(|name| {
                if self.ignore_case {
                    name.eq_ignore_ascii_case(raw)
                } else {
                    *name == raw
                }
            })
            .map(|name| Value::Str(name.clone()))
            .ok_or_else(|| {
                ConvertError::Invalid(format!(
                    "choose from {}",
                    self.metavar().unwrap_or_default()
                ))
            })
    }

    fn metavar(&self) -> Option<String> {
        Some(format!("{{{}}}", self.names.join(",")))
    }
}

/// Produces a lexically normalized [Value::Path].
///
/// Pair it with [Arg::verify](crate::Arg::verify) to check the path on
/// disk.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PathType;

impl Converter for PathType {
    fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        if raw.is_empty() {
            return Err(ConvertError::Invalid("empty path".into()));
        }

        Ok(Value::Path(normalize(Path::new(raw))))
    }
}

/// Remove `.` components and fold `dir/..` pairs, without touching the
/// filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            _ => out.push(component),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }

    out.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_converters() {
        #[derive(Debug)]
        struct TestData<'a> {
            converter: Box<dyn Converter>,
            raw: &'a str,
            result: Result<Value, ConvertError>,
        }

        let tests = vec![
            TestData {
                converter: Box::new(StringType),
                raw: "hello",
                result: Ok(Value::from("hello")),
            },
            TestData {
                converter: Box::new(IntType),
                raw: "-42",
                result: Ok(Value::Int(-42)),
            },
            TestData {
                converter: Box::new(IntType),
                raw: "4x2",
                result: Err(ConvertError::Int("4x2".parse::<i64>().unwrap_err())),
            },
            TestData {
                converter: Box::new(FloatType),
                raw: "2.5",
                result: Ok(Value::Float(2.5)),
            },
            TestData {
                converter: Box::new(FloatType),
                raw: "two",
                result: Err(ConvertError::Float("two".parse::<f64>().unwrap_err())),
            },
            TestData {
                converter: Box::new(BoolType::default()),
                raw: "true",
                result: Ok(Value::Bool(true)),
            },
            TestData {
                converter: Box::new(BoolType::new("yes", "no")),
                raw: "no",
                result: Ok(Value::Bool(false)),
            },
            TestData {
                converter: Box::new(BoolType::new("yes", "no")),
                raw: "true",
                result: Err(ConvertError::Invalid("choose from {yes,no}".into())),
            },
            TestData {
                converter: Box::new(EnumStringType::new(vec!["red", "green"])),
                raw: "green",
                result: Ok(Value::from("green")),
            },
            TestData {
                converter: Box::new(EnumStringType::new(vec!["red", "green"])),
                raw: "GREEN",
                result: Err(ConvertError::Invalid("choose from {red,green}".into())),
            },
            TestData {
                converter: Box::new(EnumStringType::new(vec!["red", "green"]).ignore_case()),
                raw: "GREEN",
                result: Ok(Value::from("green")),
            },
            TestData {
                converter: Box::new(PathType),
                raw: "./a/b/../c",
                result: Ok(Value::Path(PathBuf::from("a/c"))),
            },
            TestData {
                converter: Box::new(PathType),
                raw: "/../x",
                result: Ok(Value::Path(PathBuf::from("/x"))),
            },
            TestData {
                converter: Box::new(PathType),
                raw: "../x",
                result: Ok(Value::Path(PathBuf::from("../x"))),
            },
            TestData {
                converter: Box::new(PathType),
                raw: ".",
                result: Ok(Value::Path(PathBuf::from("."))),
            },
            TestData {
                converter: Box::new(PathType),
                raw: "",
                result: Err(ConvertError::Invalid("empty path".into())),
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let result = d.converter.convert(d.raw);

            let msg = format!("test[{}]: {:?}, result: {:?}", i, d, result);

            assert_eq!(result, d.result, "{}", msg);
        }
    }

    #[test]
    fn test_closure_converter() {
        let upper = |raw: &str| -> Result<Value, ConvertError> {
            if raw.is_empty() {
                return Err(ConvertError::Invalid("empty".into()));
            }
            Ok(Value::Str(raw.to_uppercase()))
        };

        let converter: &dyn Converter = &upper;

        assert_eq!(converter.convert("abc"), Ok(Value::from("ABC")));
        assert!(converter.convert("").is_err());
        assert_eq!(converter.metavar(), None);
    }

    #[test]
    fn test_converter_metavar() {
        assert_eq!(BoolType::default().metavar(), Some("{true,false}".into()));
        assert_eq!(
            EnumStringType::new(vec!["a", "b"]).metavar(),
            Some("{a,b}".into())
        );
        assert_eq!(IntType.metavar(), None);
    }
}
