// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Actions: how a matched argument updates the [Namespace].

use std::fmt;

use crate::args::Arg;
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::value::Value;

/// Trait that an argument action must implement.
pub trait Action: Send + Sync {
    /// Update the namespace for one occurrence of the argument.
    ///
    /// # Parameters
    ///
    /// - `arg` - The argument being processed.
    /// - `attrs` - The namespace under construction.
    /// - `flag` - The flag actually used (`None` for positionals).
    /// - `value` - The converted value, a [Value::List] for multi-value
    ///   arities, or `None` if the action does not consume a value.
    ///
    /// # Return value
    ///
    /// If an action fails, parsing stops and the error is returned to the
    /// caller of the parse function.
    fn run(
        &self,
        arg: &Arg,
        attrs: &mut Namespace,
        flag: Option<&str>,
        value: Option<Value>,
    ) -> Result<()>;

    /// Whether the argument consumes tokens at all.
    fn consumes_argument(&self) -> bool {
        true
    }

    /// Called when the action is attached to an argument; used to register
    /// the action's default value.
    fn on_attach(&self, _arg: &mut Arg) {}
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Action: {:p}", self)
    }
}

/// Store the value, replacing any previous one (the default).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Store;

impl Action for Store {
    fn run(&self, arg: &Arg, attrs: &mut Namespace, _: Option<&str>, value: Option<Value>) -> Result<()> {
        attrs.set(arg.get_dest(), value.unwrap_or_default());
        Ok(())
    }
}

/// Store `true`; defaults to `false`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StoreTrue;

impl Action for StoreTrue {
    fn run(&self, arg: &Arg, attrs: &mut Namespace, _: Option<&str>, _: Option<Value>) -> Result<()> {
        attrs.set(arg.get_dest(), true);
        Ok(())
    }

    fn consumes_argument(&self) -> bool {
        false
    }

    fn on_attach(&self, arg: &mut Arg) {
        arg.set_default(false);
    }
}

/// Store `false`; defaults to `true`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StoreFalse;

impl Action for StoreFalse {
    fn run(&self, arg: &Arg, attrs: &mut Namespace, _: Option<&str>, _: Option<Value>) -> Result<()> {
        attrs.set(arg.get_dest(), false);
        Ok(())
    }

    fn consumes_argument(&self) -> bool {
        false
    }

    fn on_attach(&self, arg: &mut Arg) {
        arg.set_default(true);
    }
}

/// Store the argument's constant, ignoring the command line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StoreConst;

impl Action for StoreConst {
    fn run(&self, arg: &Arg, attrs: &mut Namespace, _: Option<&str>, _: Option<Value>) -> Result<()> {
        attrs.set(arg.get_dest(), arg.get_constant().cloned().unwrap_or_default());
        Ok(())
    }

    fn consumes_argument(&self) -> bool {
        false
    }
}

fn push(attrs: &mut Namespace, dest: &str, value: Value) {
    let mut list = match attrs.take(dest) {
        Some(Value::List(list)) => list,
        _ => Vec::new(),
    };

    list.push(value);

    attrs.set(dest, Value::List(list));
}

/// Append the value to a list. A non-list value already stored under the
/// destination is replaced by a new list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Append;

impl Action for Append {
    fn run(&self, arg: &Arg, attrs: &mut Namespace, _: Option<&str>, value: Option<Value>) -> Result<()> {
        push(attrs, arg.get_dest(), value.unwrap_or_default());
        Ok(())
    }
}

/// Append the argument's constant to a list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AppendConst;

impl Action for AppendConst {
    fn run(&self, arg: &Arg, attrs: &mut Namespace, _: Option<&str>, _: Option<Value>) -> Result<()> {
        push(attrs, arg.get_dest(), arg.get_constant().cloned().unwrap_or_default());
        Ok(())
    }

    fn consumes_argument(&self) -> bool {
        false
    }
}

/// Count occurrences; defaults to `0`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Count;

impl Action for Count {
    fn run(&self, arg: &Arg, attrs: &mut Namespace, _: Option<&str>, _: Option<Value>) -> Result<()> {
        let n = attrs.get(arg.get_dest()).and_then(Value::as_int).unwrap_or(0);

        attrs.set(arg.get_dest(), n + 1);
        Ok(())
    }

    fn consumes_argument(&self) -> bool {
        false
    }

    fn on_attach(&self, arg: &mut Arg) {
        arg.set_default(0);
    }
}

/// Stop parsing with [Error::HelpRequested].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Help;

impl Action for Help {
    fn run(&self, _: &Arg, _: &mut Namespace, _: Option<&str>, _: Option<Value>) -> Result<()> {
        Err(Error::HelpRequested)
    }

    fn consumes_argument(&self) -> bool {
        false
    }

    fn on_attach(&self, arg: &mut Arg) {
        arg.set_suppress_default(true);
    }
}

/// Stop parsing with [Error::VersionRequested].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Version;

impl Action for Version {
    fn run(&self, _: &Arg, _: &mut Namespace, _: Option<&str>, _: Option<Value>) -> Result<()> {
        Err(Error::VersionRequested)
    }

    fn consumes_argument(&self) -> bool {
        false
    }

    fn on_attach(&self, arg: &mut Arg) {
        arg.set_suppress_default(true);
    }
}
