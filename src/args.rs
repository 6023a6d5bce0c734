// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::action::{Action, Help, Store};
use crate::arity::Arity;
use crate::choice::Choice;
use crate::convert::{Converter, StringType};
use crate::error::{Error, Result};
use crate::prefix::{looks_like_negative_number, Prefix, DEFAULT_PREFIX_CHARS};
use crate::subcommand::Subcommands;
use crate::value::Value;
use crate::verify::Verification;

/// Settings used to control the parsers behaviour.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    /// Characters that introduce a flag.
    prefix_chars: String,

    /// If set, flags and sub-commands must be given in full.
    no_abbrev: bool,

    /// If set, `-h`/`--help` is not registered automatically.
    no_help: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            prefix_chars: DEFAULT_PREFIX_CHARS.into(),
            no_abbrev: false,
            no_help: false,
        }
    }
}

impl Settings {
    /// Create a new settings object.
    pub fn new() -> Self {
        Settings::default()
    }

    /// Specify the characters that introduce a flag (default `-`).
    ///
    /// The automatic help flags use the first character.
    pub fn prefix_chars(self, chars: &str) -> Self {
        Settings {
            prefix_chars: chars.into(),
            ..self
        }
    }

    /// Require flags and sub-command names to be given in full; by
    /// default any unambiguous prefix of a long flag is accepted.
    pub fn no_abbrev(self) -> Self {
        Settings {
            no_abbrev: true,
            ..self
        }
    }

    /// Do not register `-h`/`--help`.
    pub fn no_help(self) -> Self {
        Settings {
            no_help: true,
            ..self
        }
    }

    /// Returns `true` if abbreviations are accepted.
    pub fn abbrev(&self) -> bool {
        !self.no_abbrev
    }
}

/// The declaration of one argument, either an optional (flagged) argument
/// or a positional argument.
///
/// An argument whose names all start with a prefix character is optional;
/// an argument with a single name that does not is positional.
///
/// # Example
///
/// ```
/// use argmatch::{Arg, Arity, Count, IntType};
///
/// let verbose = Arg::new(&["-v", "--verbose"]).action(Count);
/// let jobs = Arg::new(&["-j", "--jobs"]).type_(IntType).default(1);
/// let files = Arg::new(&["files"]).nargs(Arity::OneOrMore);
///
/// assert_eq!(verbose.get_dest(), "verbose");
/// assert_eq!(jobs.to_string(), "[-j JOBS]");
/// assert_eq!(files.to_string(), "files [files ...]");
/// ```
#[derive(Clone, Debug)]
pub struct Arg {
    names: Vec<String>,
    dest: String,
    dest_explicit: bool,
    positional: bool,
    arity: Arity,
    converter: Arc<dyn Converter>,
    choice: Option<Arc<dyn Choice>>,
    action: Arc<dyn Action>,
    default: Option<Value>,
    constant: Option<Value>,
    required: bool,
    group: Option<usize>,
    verification: Option<Verification>,
    help: Option<String>,
    metavar: Option<String>,
    suppress_default: bool,
}

impl Arg {
    /// Create a new argument from its flags (`&["-f", "--foo"]`) or its
    /// positional name (`&["file"]`).
    pub fn new(names: &[&str]) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let prefix = Prefix::default();
        let positional = !names.iter().any(|n| prefix.is_flag_like(n));
        let dest = derive_dest(&names, positional, &prefix);

        Arg {
            names,
            dest,
            dest_explicit: false,
            positional,
            arity: Arity::default(),
            converter: Arc::new(StringType),
            choice: None,
            action: Arc::new(Store),
            default: None,
            constant: None,
            required: false,
            group: None,
            verification: None,
            help: None,
            metavar: None,
            suppress_default: false,
        }
    }

    /// Specify the key the value is stored under in the
    /// [Namespace](crate::Namespace).
    pub fn dest(self, dest: &str) -> Self {
        Arg {
            dest: dest.into(),
            dest_explicit: true,
            ..self
        }
    }

    /// Specify the number of tokens the argument consumes.
    pub fn nargs(self, arity: Arity) -> Self {
        Arg { arity, ..self }
    }

    /// Specify the type converter (default [StringType]).
    pub fn type_<C: Converter + 'static>(self, converter: C) -> Self {
        Arg {
            converter: Arc::new(converter),
            ..self
        }
    }

    /// Restrict the converted values to an allowed set.
    pub fn choices<C: Choice + 'static>(self, choice: C) -> Self {
        Arg {
            choice: Some(Arc::new(choice)),
            ..self
        }
    }

    /// Specify the action (default [Store]).
    ///
    /// The action may register a default value (for example
    /// [Count](crate::Count) defaults to `0`); a default set explicitly
    /// with [Arg::default] is kept.
    pub fn action<A: Action + 'static>(self, action: A) -> Self {
        let action: Arc<dyn Action> = Arc::new(action);
        let user_default = self.default.clone();

        let mut arg = Arg {
            action: action.clone(),
            ..self
        };

        action.on_attach(&mut arg);

        if user_default.is_some() {
            arg.default = user_default;
        }

        arg
    }

    /// Specify the value used when the argument is not given.
    pub fn default<V: Into<Value>>(self, value: V) -> Self {
        Arg {
            default: Some(value.into()),
            ..self
        }
    }

    /// Specify the constant used by [StoreConst](crate::StoreConst),
    /// [AppendConst](crate::AppendConst) and by an optional argument with
    /// arity [Arity::Optional] given without a value.
    pub fn constant<V: Into<Value>>(self, value: V) -> Self {
        Arg {
            constant: Some(value.into()),
            ..self
        }
    }

    /// Specify that the optional argument must be provided on the
    /// command-line. Positional arguments are required when their arity
    /// has a non-zero minimum.
    pub fn required(self) -> Self {
        Arg {
            required: true,
            ..self
        }
    }

    /// Make the argument a member of a mutually exclusive group (see
    /// [Args::add_mutually_exclusive_group]).
    pub fn group(self, group: usize) -> Self {
        Arg {
            group: Some(group),
            ..self
        }
    }

    /// Verify every converted value against the chain.
    pub fn verify(self, verification: Verification) -> Self {
        Arg {
            verification: Some(verification),
            ..self
        }
    }

    /// Specify the help text for the argument.
    pub fn help(self, help: &str) -> Self {
        Arg {
            help: Some(help.into()),
            ..self
        }
    }

    /// Specify the name used for the value in usage text.
    pub fn metavar(self, metavar: &str) -> Self {
        Arg {
            metavar: Some(metavar.into()),
            ..self
        }
    }

    /// Do not create an entry when the argument is not given.
    pub fn suppress_default(self) -> Self {
        Arg {
            suppress_default: true,
            ..self
        }
    }

    /// Register a default value; used by [Action::on_attach].
    pub fn set_default<V: Into<Value>>(&mut self, value: V) {
        self.default = Some(value.into());
    }

    /// Set whether the default is suppressed; used by
    /// [Action::on_attach].
    pub fn set_suppress_default(&mut self, suppress: bool) {
        self.suppress_default = suppress;
    }

    /// Flags, or the positional name.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Destination key.
    pub fn get_dest(&self) -> &str {
        &self.dest
    }

    /// Returns `true` for positional arguments.
    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// The declared arity.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// The allowed set, if any.
    pub fn get_choices(&self) -> Option<&dyn Choice> {
        self.choice.as_deref()
    }

    /// The constant, if any.
    pub fn get_constant(&self) -> Option<&Value> {
        self.constant.as_ref()
    }

    /// The declared or action-registered default, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns `true` if no entry is created for an absent argument.
    pub fn is_default_suppressed(&self) -> bool {
        self.suppress_default
    }

    /// Returns `true` if the argument must be given.
    pub fn is_required(&self) -> bool {
        if self.positional {
            self.arity.min() > 0
        } else {
            self.required
        }
    }

    /// The help text, if any.
    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Group membership, if any.
    pub fn get_group(&self) -> Option<usize> {
        self.group
    }

    /// Returns `true` if the argument's action consumes tokens.
    pub fn consumes_argument(&self) -> bool {
        self.action.consumes_argument()
    }

    pub(crate) fn get_action(&self) -> &dyn Action {
        self.action.as_ref()
    }

    pub(crate) fn get_converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    pub(crate) fn get_verification(&self) -> Option<&Verification> {
        self.verification.as_ref()
    }

    /// The value stored when the argument is absent: the declared default,
    /// an empty list for multi-value arguments, otherwise [Value::Null].
    /// `None` when the default is suppressed.
    pub fn effective_default(&self) -> Option<Value> {
        if self.suppress_default {
            return None;
        }

        if let Some(value) = &self.default {
            return Some(value.clone());
        }

        if self.consumes_argument() && !self.arity.is_scalar() {
            return Some(Value::List(Vec::new()));
        }

        Some(Value::Null)
    }

    /// Name used in error messages: the flags joined by `/`, or the
    /// positional's metavar.
    pub fn textual_name(&self) -> String {
        if self.positional {
            self.format_metavar()
        } else {
            self.names.join("/")
        }
    }

    /// Name used for the value in usage text.
    pub fn format_metavar(&self) -> String {
        if let Some(metavar) = &self.metavar {
            return metavar.clone();
        }

        if let Some(choice) = &self.choice {
            return choice.textual_format();
        }

        if let Some(metavar) = self.converter.metavar() {
            return metavar;
        }

        if self.positional {
            self.dest.clone()
        } else {
            self.dest.to_uppercase()
        }
    }

    fn format_values(&self) -> String {
        let m = self.format_metavar();

        match self.arity {
            Arity::Fixed(n) => vec![m; n].join(" "),
            Arity::Optional => format!("[{}]", m),
            Arity::ZeroOrMore => format!("[{} ...]", m),
            Arity::OneOrMore => format!("{0} [{0} ...]", m),
            Arity::Remainder => "...".into(),
        }
    }

    fn set_dest_from(&mut self, prefix: &Prefix) {
        if !self.dest_explicit {
            self.dest = derive_dest(&self.names, self.positional, prefix);
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.positional {
            return write!(f, "{}", self.format_values());
        }

        let flag = self.names.first().map(String::as_str).unwrap_or("");

        let syntax = if self.consumes_argument() {
            let values = self.format_values();

            if values.is_empty() {
                flag.to_string()
            } else {
                format!("{} {}", flag, values)
            }
        } else {
            flag.to_string()
        };

        if self.required {
            write!(f, "{}", syntax)
        } else {
            write!(f, "[{}]", syntax)
        }
    }
}

/// Destination key for a set of names: the first long flag (else the first
/// flag) without its prefix and with `-` replaced by `_`.
fn derive_dest(names: &[String], positional: bool, prefix: &Prefix) -> String {
    if positional {
        return names.first().cloned().unwrap_or_default();
    }

    names
        .iter()
        .find(|n| prefix.is_long_flag(n))
        .or_else(|| names.first())
        .map(|n| prefix.strip(n).replace('-', "_"))
        .unwrap_or_default()
}

/// One flag resolved by [Args::resolve_flag].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlagMatch {
    /// Index of the argument in declaration order.
    pub index: usize,
    /// The registered flag that matched.
    pub flag: String,
    /// Value embedded in the token (`--foo=bar`, `-fbar`).
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct MutexGroup {
    required: bool,
}

/// The registry of declared arguments.
#[derive(Clone, Debug)]
pub struct Args {
    settings: Settings,
    prefix: Prefix,

    /// Every argument in declaration order.
    entries: Vec<Arg>,

    /// Flag to index into `entries`.
    flags: IndexMap<String, usize>,

    /// Indices of the positional arguments, in declaration order.
    positionals: Vec<usize>,

    groups: Vec<MutexGroup>,

    /// Set when some flag itself looks like a negative number.
    negative_number_flags: bool,

    subcommands: Option<Subcommands>,
}

impl Default for Args {
    fn default() -> Self {
        Self::new()
    }
}

impl Args {
    /// Create a new registry with the default [Settings].
    pub fn new() -> Self {
        Args::with_settings(Settings::default())
    }

    /// Create a new registry. Unless [Settings::no_help] is set, a
    /// [Help] argument is registered for `-h` and `--help`.
    pub fn with_settings(settings: Settings) -> Self {
        let prefix = Prefix::new(&settings.prefix_chars);
        let help_prefix = prefix.first();

        let mut args = Args {
            settings,
            prefix,
            entries: Vec::new(),
            flags: IndexMap::new(),
            positionals: Vec::new(),
            groups: Vec::new(),
            negative_number_flags: false,
            subcommands: None,
        };

        if let (false, Some(c)) = (args.settings.no_help, help_prefix) {
            let short = format!("{}h", c);
            let long = format!("{0}{0}help", c);

            let mut help = Arg::new(&[short.as_str(), long.as_str()])
                .action(Help)
                .help("show this help message and exit");

            help.positional = false;
            help.set_dest_from(&args.prefix);

            args.insert(help);
        }

        args
    }

    /// The settings the registry was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The prefix classifier of this registry.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Register a single argument.
    ///
    /// Fails with [Error::DeclarationConflict] if the argument clashes
    /// with the arguments already registered.
    pub fn add(&mut self, arg: Arg) -> Result<()> {
        let mut arg = arg;

        if arg.names.is_empty() {
            return Err(conflict("argument has no name"));
        }

        let flag_like = arg
            .names
            .iter()
            .filter(|n| self.prefix.is_flag_like(n))
            .count();

        arg.positional = match flag_like {
            0 if arg.names.len() == 1 => true,
            0 => {
                return Err(conflict(&format!(
                    "positional argument has more than one name: {}",
                    arg.names.join(", ")
                )))
            }
            n if n == arg.names.len() => false,
            _ => {
                return Err(conflict(&format!(
                    "cannot mix flags and positional names: {}",
                    arg.names.join(", ")
                )))
            }
        };

        arg.set_dest_from(&self.prefix);

        if let Some(group) = arg.group {
            if group >= self.groups.len() {
                return Err(conflict(&format!("unknown group {}", group)));
            }

            if arg.positional {
                return Err(conflict(&format!(
                    "positional argument {} cannot be in a group",
                    arg.dest
                )));
            }
        }

        if arg.positional {
            self.check_positional(&arg)?;
        } else if let Some(flag) = arg.names.iter().find(|n| self.flags.contains_key(*n)) {
            return Err(conflict(&format!("conflicting option string: {}", flag)));
        }

        self.insert(arg);

        Ok(())
    }

    fn check_positional(&self, arg: &Arg) -> Result<()> {
        if !arg.consumes_argument() {
            return Err(conflict(&format!(
                "positional argument {} must consume a value",
                arg.dest
            )));
        }

        if self.positionals().any(|p| p.dest == arg.dest) {
            return Err(conflict(&format!(
                "duplicate positional argument: {}",
                arg.dest
            )));
        }

        if self.subcommands.is_some() && arg.arity.is_unbounded() {
            return Err(conflict(&format!(
                "positional argument {} is unbounded but sub-commands are declared",
                arg.dest
            )));
        }

        if let Some(last) = self.positionals().last() {
            if last.arity == Arity::Remainder {
                return Err(conflict(&format!(
                    "positional argument {} follows a remainder argument",
                    arg.dest
                )));
            }

            if last.arity.is_unbounded() && arg.arity.is_unbounded() {
                return Err(conflict(&format!(
                    "adjacent unbounded positional arguments: {} and {}",
                    last.dest, arg.dest
                )));
            }
        }

        Ok(())
    }

    fn insert(&mut self, arg: Arg) {
        let index = self.entries.len();

        if arg.positional {
            self.positionals.push(index);
        } else {
            for name in &arg.names {
                if looks_like_negative_number(name) {
                    self.negative_number_flags = true;
                }

                self.flags.insert(name.clone(), index);
            }
        }

        self.entries.push(arg);
    }

    /// Create a mutually exclusive group and return its id, for use with
    /// [Arg::group].
    ///
    /// If `required` is set, one member of the group must be given.
    pub fn add_mutually_exclusive_group(&mut self, required: bool) -> usize {
        self.groups.push(MutexGroup { required });
        self.groups.len() - 1
    }

    /// Attach sub-commands. Fails if sub-commands are already attached or
    /// if an unbounded positional argument is declared.
    pub fn add_subcommands(&mut self, subcommands: Subcommands) -> Result<()> {
        if self.subcommands.is_some() {
            return Err(conflict("sub-commands already declared"));
        }

        if let Some(p) = self.positionals().find(|p| p.arity.is_unbounded()) {
            return Err(conflict(&format!(
                "positional argument {} is unbounded but sub-commands are declared",
                p.dest
            )));
        }

        self.subcommands = Some(subcommands);

        Ok(())
    }

    /// The attached sub-commands, if any.
    pub fn subcommands(&self) -> Option<&Subcommands> {
        self.subcommands.as_ref()
    }

    /// Number of registered arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no argument is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every argument in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.entries.iter()
    }

    /// Returns the argument at the specified index.
    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.entries.get(index)
    }

    pub(crate) fn entry(&self, index: usize) -> &Arg {
        &self.entries[index]
    }

    /// Returns the argument registered for the flag (no abbreviation).
    pub fn get_flag(&self, flag: &str) -> Option<&Arg> {
        self.flags.get(flag).and_then(|i| self.entries.get(*i))
    }

    /// Iterate over the optional arguments in declaration order.
    pub fn optionals(&self) -> impl Iterator<Item = &Arg> {
        self.entries.iter().filter(|a| !a.positional)
    }

    /// Iterate over the positional arguments in declaration order.
    pub fn positionals(&self) -> impl Iterator<Item = &Arg> {
        self.positionals.iter().map(move |i| &self.entries[*i])
    }

    pub(crate) fn positional_indices(&self) -> &[usize] {
        &self.positionals
    }

    /// Returns the id and member names of every required group.
    pub(crate) fn required_groups(&self) -> impl Iterator<Item = (usize, Vec<String>)> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.required)
            .map(move |(id, _)| {
                let members = self
                    .optionals()
                    .filter(|a| a.group == Some(id))
                    .map(Arg::textual_name)
                    .collect();

                (id, members)
            })
    }

    /// Returns `true` if the token selects an optional argument.
    ///
    /// Tokens shaped like negative numbers are positional values unless
    /// some registered flag itself looks like a negative number.
    pub fn is_flag(&self, token: &str) -> bool {
        if !self.prefix.is_flag_like(token) {
            return false;
        }

        if self.flags.contains_key(token) {
            return true;
        }

        !(looks_like_negative_number(token) && !self.negative_number_flags)
    }

    /// Resolve a flag-like token to the registered argument(s).
    ///
    /// - An exact match always wins.
    /// - `--flag=value` is split at the first `=`.
    /// - A single-prefixed token whose first character is a registered
    ///   short flag is a cluster: `-abc` runs `-a`, `-b` and `-c`; the
    ///   first flag that takes a value takes the rest of the token
    ///   (`-ofile`).
    /// - Otherwise, unless abbreviation is disabled, a unique prefix of a
    ///   long flag resolves to it.
    ///
    /// Returns one match per flag; only a cluster produces more than one.
    pub fn resolve_flag(&self, token: &str) -> Result<Vec<FlagMatch>> {
        if let Some(m) = self.exact(token, None) {
            return Ok(vec![m]);
        }

        let (name, value) = match token.find('=') {
            Some(pos) => (&token[..pos], Some(token[pos + 1..].to_string())),
            None => (token, None),
        };

        if value.is_some() {
            if let Some(m) = self.exact(name, value.clone()) {
                return Ok(vec![m]);
            }
        }

        if self.prefix.is_single_prefixed(token) {
            if let Some(matches) = self.cluster(token)? {
                return Ok(matches);
            }
        }

        if self.settings.abbrev() && self.prefix.is_long_flag(name) {
            return self.abbreviation(token, name, value);
        }

        Err(Error::UnknownFlag { flag: token.into() })
    }

    fn exact(&self, flag: &str, value: Option<String>) -> Option<FlagMatch> {
        self.flags.get(flag).map(|index| FlagMatch {
            index: *index,
            flag: flag.into(),
            value,
        })
    }

    fn abbreviation(&self, token: &str, name: &str, value: Option<String>) -> Result<Vec<FlagMatch>> {
        let mut candidates: Vec<(&String, usize)> = self
            .flags
            .iter()
            .filter(|(flag, _)| flag.len() > name.len() && flag.starts_with(name))
            .filter(|(flag, _)| self.prefix.is_long_flag(flag))
            .map(|(flag, index)| (flag, *index))
            .collect();

        candidates.sort();

        let first = match candidates.first() {
            Some(first) => *first,
            None => return Err(Error::UnknownFlag { flag: token.into() }),
        };

        if candidates.iter().all(|(_, index)| *index == first.1) {
            return Ok(vec![FlagMatch {
                index: first.1,
                flag: first.0.clone(),
                value,
            }]);
        }

        Err(Error::AmbiguousFlag {
            flag: token.into(),
            candidates: candidates.into_iter().map(|(f, _)| f.clone()).collect(),
        })
    }

    /// Split `-abc` into short flags. Returns `None` if the first
    /// character is not a registered short flag.
    fn cluster(&self, token: &str) -> Result<Option<Vec<FlagMatch>>> {
        let mut chars = token.char_indices();

        let prefix = match chars.next() {
            Some((_, c)) => c,
            None => return Ok(None),
        };

        let mut matches = Vec::new();

        for (pos, c) in chars {
            let flag = format!("{}{}", prefix, c);

            let index = match self.flags.get(&flag) {
                Some(index) => *index,
                None if matches.is_empty() => return Ok(None),
                None => return Err(Error::UnknownFlag { flag: token.into() }),
            };

            let rest = &token[pos + c.len_utf8()..];

            if self.entries[index].consumes_argument() {
                let value = match rest.strip_prefix('=') {
                    Some(v) => Some(v.to_string()),
                    None if rest.is_empty() => None,
                    None => Some(rest.to_string()),
                };

                matches.push(FlagMatch { index, flag, value });

                return Ok(Some(matches));
            }

            matches.push(FlagMatch {
                index,
                flag,
                value: None,
            });
        }

        Ok(Some(matches))
    }
}

fn conflict(msg: &str) -> Error {
    Error::DeclarationConflict(msg.into())
}
