// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use thiserror::Error;

use crate::convert::ConvertError;

/// The error type.
///
/// Every parse-time variant carries enough context (the offending token
/// and the argument's display name) for a presentation layer to render a
/// one line diagnostic. The parser never prints or exits on its own.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    //------------------------------
    // Incorrect API usage errors (programmer error)
    //------------------------------
    /// The registry was declared inconsistently (duplicate flag, duplicate
    /// positional, adjacent unbounded positionals, ...).
    #[error("declaration conflict: {0}")]
    DeclarationConflict(String),

    //------------------------------
    // Runtime errors (user error)
    //------------------------------
    /// User specified a flag that no argument answers to.
    #[error("unrecognized arguments: '{flag}'")]
    UnknownFlag {
        /// The literal token.
        flag: String,
    },

    /// User specified an abbreviation matching more than one flag.
    #[error("ambiguous option: {flag} could match {}", .candidates.join(", "))]
    AmbiguousFlag {
        /// The literal token.
        flag: String,
        /// Every flag the token is a prefix of (sorted).
        candidates: Vec<String>,
    },

    /// An argument that must be specified was not specified.
    #[error("argument {arg} is required")]
    MissingRequiredArgument {
        /// Display name of the argument.
        arg: String,
    },

    /// None of the members of a required mutually exclusive group was used.
    #[error("one of the arguments {} is required", .args.join(" "))]
    MissingRequiredGroup {
        /// Display names of the group members.
        args: Vec<String>,
    },

    /// Two members of one mutually exclusive group were used together.
    #[error("argument {arg}: not allowed with argument {other}")]
    MutuallyExclusive {
        /// The argument that was rejected.
        arg: String,
        /// The group member used first.
        other: String,
    },

    /// Fewer tokens were available than the argument's arity requires.
    #[error("argument {arg}: expected {needed} argument(s), got {available}")]
    InsufficientTokens {
        /// Display name of the argument.
        arg: String,
        /// Minimum number of tokens required.
        needed: usize,
        /// Number of tokens that were available.
        available: usize,
    },

    /// Positional tokens were left over after every argument was satisfied.
    #[error("unrecognized arguments: '{}'", .tokens.join(" "))]
    ExtraPositionalTokens {
        /// The surplus tokens.
        tokens: Vec<String>,
    },

    /// A flag that takes no value was given one (`--verbose=1`).
    #[error("argument {arg}: ignore implicit argument '{value}'")]
    UnexpectedValue {
        /// Display name of the argument.
        arg: String,
        /// The embedded value.
        value: String,
    },

    /// The argument's converter rejected a token.
    #[error("argument {arg}: could not convert '{value}': {cause}")]
    Conversion {
        /// Display name of the argument.
        arg: String,
        /// The literal token.
        value: String,
        /// Why the converter failed.
        cause: ConvertError,
    },

    /// A converted value is not in the argument's allowed set.
    #[error("argument {arg}: invalid choice: '{value}' (choose from {allowed})")]
    ChoiceViolation {
        /// Display name of the argument.
        arg: String,
        /// The literal token.
        value: String,
        /// Textual rendering of the allowed set.
        allowed: String,
    },

    /// A value failed its verification chain.
    #[error("argument {arg}: '{value}' failed check '{check}' (group {group})")]
    VerificationFailure {
        /// Display name of the argument.
        arg: String,
        /// The value under test.
        value: String,
        /// Name of the predicate that failed.
        check: String,
        /// Index of the group the predicate belongs to.
        group: usize,
    },

    /// The sub-command token does not name any sub-command.
    #[error("invalid choice: '{command}' (choose from {})", quote_list(.valid))]
    InvalidSubcommand {
        /// The literal token.
        command: String,
        /// Primary names of every sub-command.
        valid: Vec<String>,
    },

    /// The sub-command token abbreviates more than one sub-command.
    #[error("ambiguous command: {command} could match {}", .candidates.join(", "))]
    AmbiguousSubcommand {
        /// The literal token.
        command: String,
        /// Matching command names (sorted).
        candidates: Vec<String>,
    },

    /// Sub-commands are declared but none was given.
    #[error("too few arguments: expected a command (choose from {})", quote_list(.valid))]
    MissingSubcommand {
        /// Primary names of every sub-command.
        valid: Vec<String>,
    },

    //------------------------------
    // Terminal outcomes
    //------------------------------
    /// A help action ran; the caller should render help and stop.
    #[error("help requested")]
    HelpRequested,

    /// A version action ran; the caller should render the version and stop.
    #[error("version requested")]
    VersionRequested,

    /// Failure raised by a user supplied action.
    #[error("generic error: {0:?}")]
    GenericError(String),
}

impl Error {
    /// Returns `true` for the help/version outcomes, which are requests
    /// rather than failures.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Error::HelpRequested | Error::VersionRequested)
    }

    /// The literal token the error refers to, if there is exactly one.
    pub fn token(&self) -> Option<&str> {
        match self {
            Error::UnknownFlag { flag } | Error::AmbiguousFlag { flag, .. } => Some(flag),
            Error::UnexpectedValue { value, .. }
            | Error::Conversion { value, .. }
            | Error::ChoiceViolation { value, .. }
            | Error::VerificationFailure { value, .. } => Some(value),
            Error::InvalidSubcommand { command, .. }
            | Error::AmbiguousSubcommand { command, .. } => Some(command),
            _ => None,
        }
    }
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<String>>()
        .join(", ")
}

/// Convenience type that allows a function to be defined as returning a
/// [Result], but which only requires the success type to be specified,
/// defaulting the error type to this crates `Error` type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
