// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

#![deny(missing_docs)]
#![forbid(unsafe_code)]

//! Declarative, argparse-style command-line argument matching.
//!
//! Declare the arguments a program accepts, then hand over the raw
//! command-line tokens: you get back a [Namespace] holding one typed
//! value per destination, or a structured [Error] saying exactly what was
//! wrong.
//!
//! ---
//!
//! Table of contents:
//!
//! * [Overview](#overview)
//! * [Quickstart](#quickstart)
//! * [Examples](#examples)
//! * [Details](#details)
//! * [Summary of features and behaviour](#summary-of-features-and-behaviour)
//! * [Limitations](#limitations)
//!
//! ---
//!
//! # Overview
//!
//! Parsing happens in one pass over the tokens:
//!
//! - Flag-like tokens are resolved to a registered optional argument,
//!   which takes as many of the following tokens as its [Arity] allows.
//! - Every other token is pooled. Once all tokens are read, the pool is
//!   shared out between the positional arguments in declaration order.
//! - Each value is converted ([Converter]), checked against the allowed
//!   values ([Choice]) and, for paths, verified against the filesystem
//!   ([Verification]) before the argument's [Action] stores it.
//!
//! The parser never prints and never exits. A help or version request is
//! reported as [Error::HelpRequested] or [Error::VersionRequested]; what to
//! show is up to the caller.
//!
//! # Quickstart
//!
//! 1. Create an [Args] registry. It answers to `-h` and `--help`
//!    automatically.
//!
//!    ```rust
//!    # use argmatch::Args;
//!    #
//!    let mut args = Args::new();
//!    ```
//!
//! 1. Add an [Arg] for each argument. Names starting with a prefix
//!    character (`-` by default) declare optional arguments; a bare name
//!    declares a positional argument.
//!
//!    ```rust
//!    # use argmatch::{Arg, Args, Arity, Count, IntType, Result};
//!    #
//!    # fn main() -> Result<()> {
//!    # let mut args = Args::new();
//!    #
//!    // "-v", "-vv", "--verbose": counts occurrences.
//!    args.add(Arg::new(&["-v", "--verbose"]).action(Count))?;
//!
//!    // "--jobs 4", "--jobs=4": an integer.
//!    args.add(Arg::new(&["-j", "--jobs"]).type_(IntType).default(1))?;
//!
//!    // One or more files.
//!    args.add(Arg::new(&["files"]).nargs(Arity::OneOrMore))?;
//!    # Ok(())
//!    # }
//!    ```
//!
//! 1. Create an [App] and parse.
//!
//!    ```rust
//!    # use argmatch::{App, Arg, Args, Arity, Count, IntType, Result};
//!    #
//!    # fn main() -> Result<()> {
//!    # let mut args = Args::new();
//!    # args.add(Arg::new(&["-v", "--verbose"]).action(Count))?;
//!    # args.add(Arg::new(&["-j", "--jobs"]).type_(IntType).default(1))?;
//!    # args.add(Arg::new(&["files"]).nargs(Arity::OneOrMore))?;
//!    #
//!    let app = App::new("build").args(args);
//!
//!    let attrs = app.parse_with_args(vec!["-vv", "a.c", "--jobs=4", "b.c"])?;
//!
//!    assert_eq!(attrs.get_int("verbose"), Some(2));
//!    assert_eq!(attrs.get_int("jobs"), Some(4));
//!    assert_eq!(attrs.get_list("files").map(|f| f.len()), Some(2));
//!    # Ok(())
//!    # }
//!    ```
//!
//!    Use [App::parse()] to parse the program's own arguments.
//!
//! # Examples
//!
//! ```rust
//! use argmatch::{App, Arg, Args, Error, StoreTrue, Subcommands};
//!
//! # fn main() -> argmatch::Result<()> {
//! let mut add = Args::new();
//! add.add(Arg::new(&["name"]))?;
//! add.add(Arg::new(&["-f", "--force"]).action(StoreTrue))?;
//!
//! let mut commands = Subcommands::new().dest("command");
//! commands.add("add", &["a"], App::new("add").args(add))?;
//! commands.add("list", &["ls"], App::new("list"))?;
//!
//! let mut args = Args::new();
//! args.add(Arg::new(&["--dry-run"]).action(StoreTrue))?;
//! args.add_subcommands(commands)?;
//!
//! let app = App::new("pkg").args(args);
//!
//! let attrs = app.parse_with_args(vec!["--dry", "add", "-f", "thing"])?;
//!
//! assert_eq!(attrs.get_str("command"), Some("add"));
//! assert_eq!(attrs.get_str("name"), Some("thing"));
//! assert_eq!(attrs.get_bool("force"), Some(true));
//! assert_eq!(attrs.get_bool("dry_run"), Some(true));
//!
//! let result = app.parse_with_args(vec!["remove"]);
//! assert!(matches!(result, Err(Error::InvalidSubcommand { .. })));
//! # Ok(())
//! # }
//! ```
//!
//! See also the `simple` demo:
//!
//! ```bash
//! $ RUST_LOG=argmatch=trace cargo run --example simple -- -vv --mode fast a b
//! ```
//!
//! # Details
//!
//! ## Flags
//!
//! - A token is flag-like if it starts with a prefix character and has
//!   something after the prefix run. `-` alone is a positional value.
//! - Tokens shaped like negative numbers (`-1`, `-2.5`) are positional
//!   values, unless a registered flag itself looks like a negative number.
//! - `--flag=value` supplies the first value inline.
//! - Short flags can be clustered: `-vvx` is `-v -v -x`, and `-ofile` is
//!   `-o file`.
//! - A long flag can be abbreviated to any unambiguous prefix (see
//!   [Settings::no_abbrev]).
//! - The first `--` ends option processing.
//!
//! ## Positional arguments
//!
//! Positional tokens may be interleaved with optional arguments. They are
//! shared out greedily, in declaration order, but each argument leaves
//! enough tokens for the minimum of the arguments after it:
//!
//! ```text
//! src: *   dst: 1     a b c  =>  src=[a, b]  dst=c
//! ```
//!
//! ## Destinations and defaults
//!
//! - The destination key is derived from the first long flag (`--dry-run`
//!   stores to `dry_run`), else the first short flag, or set with
//!   [Arg::dest].
//! - Every destination is present in the [Namespace]: arguments that were
//!   not given hold their default ([Value::Null], `0` for [Count], an empty
//!   list for multi-value arguments). [Arg::suppress_default] leaves the key
//!   out instead.
//! - Parser level defaults ([App::set_default]) take precedence over
//!   argument defaults, but never over a value from the command-line.
//!
//! # Summary of features and behaviour
//!
//! - Optional and positional arguments with fixed, optional, unbounded and
//!   remainder arities.
//! - Store, const, append, count, help and version actions, and custom
//!   [Action] implementations.
//! - Typed conversion with custom converters, choices and ranges.
//! - Filesystem verification chains with alternative groups.
//! - Mutually exclusive groups, optionally required.
//! - Nested sub-commands with aliases and abbreviations.
//! - [App::parse_known_args] to collect unrecognised tokens instead of
//!   failing.
//! - Results can be deserialized onto a typed struct
//!   ([Namespace::deserialize]).
//! - Parsing never mutates the [App]: one instance can serve many threads.
//! - Diagnostics through [`tracing`](https://crates.io/crates/tracing); the
//!   library never installs a subscriber.
//!
//! # Limitations
//!
//! - No help or usage rendering beyond the per-argument syntax ([Arg]
//!   implements `Display`).
//! - No response files (`@args.txt`).
//! - Sub-commands are always required, and a parser with sub-commands
//!   cannot also have unbounded positional arguments.

mod action;
mod app;
mod args;
mod arity;
mod choice;
mod convert;
mod error;
mod namespace;
mod prefix;
mod subcommand;
mod value;
mod verify;

pub use error::{Error, Result};

pub use action::{
    Action, Append, AppendConst, Count, Help, Store, StoreConst, StoreFalse, StoreTrue, Version,
};
pub use app::{get_args, App};
pub use args::{Arg, Args, FlagMatch, Settings};
pub use arity::{partition, Arity, Mismatch};
pub use choice::{Choice, Choices, Range};
pub use convert::{
    BoolType, ConvertError, Converter, EnumStringType, FloatType, IntType, PathType, StringType,
};
pub use namespace::Namespace;
pub use prefix::{looks_like_negative_number, Classification, Prefix, DEFAULT_PREFIX_CHARS};
pub use subcommand::Subcommands;
pub use value::Value;
pub use verify::{Check, Failure, Filesystem, Group, HostFilesystem, Predicate, Verification};
