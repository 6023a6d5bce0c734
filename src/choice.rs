// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::cmp::Ordering;
use std::fmt;

use crate::value::Value;

/// Restricts the values an argument accepts.
pub trait Choice: Send + Sync {
    /// Returns `true` if the converted value is allowed.
    fn contains(&self, value: &Value) -> bool;

    /// Rendering of the allowed set, used in errors and as the default
    /// metavar.
    fn textual_format(&self) -> String;
}

impl fmt::Debug for dyn Choice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Choice: {}", self.textual_format())
    }
}

/// An explicit collection of allowed values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Choices {
    values: Vec<Value>,
}

impl Choices {
    /// Create a choice from the specified values.
    pub fn new<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Choices {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The allowed values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Choice for Choices {
    fn contains(&self, value: &Value) -> bool {
        self.values.iter().any(|v| v == value)
    }

    fn textual_format(&self) -> String {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();

        format!("{{{}}}", values.join(","))
    }
}

/// An inclusive range of allowed values.
#[derive(Clone, Debug, PartialEq)]
pub struct Range {
    min: Value,
    max: Value,
}

impl Range {
    /// Create a choice accepting `min..=max`.
    pub fn new<T: Into<Value>>(min: T, max: T) -> Self {
        Range {
            min: min.into(),
            max: max.into(),
        }
    }
}

impl Choice for Range {
    fn contains(&self, value: &Value) -> bool {
        let above = matches!(
            self.min.compare(value),
            Some(Ordering::Less) | Some(Ordering::Equal)
        );
        let below = matches!(
            self.max.compare(value),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        );

        above && below
    }

    fn textual_format(&self) -> String {
        format!("{{{}..{}}}", self.min, self.max)
    }
}
