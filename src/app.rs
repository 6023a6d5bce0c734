// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use std::collections::{HashMap, HashSet};
use std::env;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::args::{Arg, Args};
use crate::arity::{partition, Arity, Mismatch};
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::value::Value;

/// Special argument that is silently consumed and used to denote the end of
/// all options; all arguments that follow are considered to be positional
/// arguments (even if they start with `-`!)
///
/// Only the first occurrence is consumed.
const END_OF_OPTIONS: &str = "--";

/// Get a list of all command-line arguments specified to the program with
/// the program name (the first argument) removed.
///
/// # Note
///
/// Used with [App::parse_with_args()]. However, this isn't usually
/// required: just call [App::parse()].
pub fn get_args() -> Vec<String> {
    env::args().skip(1).collect()
}

/// The main object used to represent the program (or one sub-command).
///
/// An `App` is built once and can then be used for any number of parses,
/// from any number of threads: parsing never modifies it.
#[derive(Clone, Debug, Default)]
pub struct App {
    name: String,
    version: String,
    summary: String,
    args: Args,

    /// Parser level defaults; these win over argument defaults.
    defaults: IndexMap<String, Value>,
}

impl App {
    /// Create a new application object.
    pub fn new(name: &str) -> Self {
        App::default().name(name)
    }

    fn name(self, name: &str) -> Self {
        App {
            name: name.into(),
            ..self
        }
    }

    /// Specify the registry of arguments to parse the command-line with.
    pub fn args(self, args: Args) -> Self {
        App { args, ..self }
    }

    /// Specify the version of the program.
    pub fn version(self, version: &str) -> Self {
        App {
            version: version.into(),
            ..self
        }
    }

    /// Specify brief explanatory text for the program.
    pub fn summary(self, summary: &str) -> Self {
        App {
            summary: summary.into(),
            ..self
        }
    }

    /// Specify a parser level default.
    ///
    /// Parser level defaults overwrite the defaults of the arguments and,
    /// after a sub-command has run, the defaults of the sub-command. They
    /// never overwrite a value given on the command-line.
    pub fn set_default<V: Into<Value>>(self, key: &str, value: V) -> Self {
        let mut defaults = self.defaults;

        defaults.insert(key.into(), value.into());

        App { defaults, ..self }
    }

    /// Specify several parser level defaults.
    pub fn set_defaults<I, K, V>(self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut all = self.defaults;

        all.extend(defaults.into_iter().map(|(k, v)| (k.into(), v.into())));

        App {
            defaults: all,
            ..self
        }
    }

    /// The name of the program.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// The version of the program.
    pub fn get_version(&self) -> &str {
        &self.version
    }

    /// The summary of the program.
    pub fn get_summary(&self) -> &str {
        &self.summary
    }

    /// The registry of arguments.
    pub fn get_args(&self) -> &Args {
        &self.args
    }

    /// The parser level default for the key, if any.
    pub fn get_default(&self, key: &str) -> Option<&Value> {
        self.defaults.get(key)
    }

    /// Parse the program's command-line arguments.
    pub fn parse(&self) -> Result<Namespace> {
        self.parse_with_args(get_args())
    }

    /// Parse a set of command line arguments (without the program name).
    ///
    /// # Arguments
    ///
    /// - `cli_args`: The arguments. Specify your own, or call [get_args()].
    ///
    /// # Return value
    ///
    /// The [Namespace] holding one entry per destination, or the first
    /// error found. A help or version action ends the parse with
    /// [Error::HelpRequested] or [Error::VersionRequested].
    pub fn parse_with_args<I, S>(&self, cli_args: I) -> Result<Namespace>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (attrs, _) = self.run(to_tokens(cli_args), false)?;

        Ok(attrs)
    }

    /// Like [App::parse_with_args], but unknown flags and surplus
    /// positional values are returned (in command-line order) rather than
    /// failing the parse.
    pub fn parse_known_args<I, S>(&self, cli_args: I) -> Result<(Namespace, Vec<String>)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.run(to_tokens(cli_args), true)
    }

    fn run(&self, tokens: Vec<String>, known_only: bool) -> Result<(Namespace, Vec<String>)> {
        debug!(parser = %self.name, tokens = tokens.len(), known_only, "parse");

        let mut state = ParseState::new(self, known_only);

        state.populate_defaults();
        state.consume(&tokens)?;
        state.finish()
    }
}

fn to_tokens<I, S>(cli_args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cli_args
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect()
}

/// Per call state. The [App] is only borrowed.
struct ParseState<'a> {
    app: &'a App,
    known_only: bool,
    attrs: Namespace,

    /// Positional tokens in command-line order.
    pool: Vec<String>,

    /// Tokens returned by [App::parse_known_args].
    extras: Vec<String>,

    /// Indices of the arguments that were given.
    seen: HashSet<usize>,

    /// Mutually exclusive group id to the index of the member used.
    used_groups: HashMap<usize, usize>,

    /// The chosen sub-command (primary name and parser) and the tokens
    /// that follow it.
    command: Option<(&'a str, &'a App, Vec<String>)>,
}

impl<'a> ParseState<'a> {
    fn new(app: &'a App, known_only: bool) -> Self {
        ParseState {
            app,
            known_only,
            attrs: Namespace::new(),
            pool: Vec::new(),
            extras: Vec::new(),
            seen: HashSet::new(),
            used_groups: HashMap::new(),
            command: None,
        }
    }

    fn args(&self) -> &'a Args {
        &self.app.args
    }

    fn arg(&self, index: usize) -> &'a Arg {
        self.args().entry(index)
    }

    fn populate_defaults(&mut self) {
        for arg in self.args().iter() {
            if let Some(value) = arg.effective_default() {
                self.attrs.set_default(arg.get_dest(), value);
            }
        }

        self.apply_parser_defaults();
    }

    fn apply_parser_defaults(&mut self) {
        for (key, value) in &self.app.defaults {
            trace!(key = %key, value = %value, "parser default");

            self.attrs.set_default(key, value.clone());
        }
    }

    fn consume(&mut self, tokens: &[String]) -> Result<()> {
        let args = self.args();
        let remainder_at = remainder_position(args);

        let mut options_done = false;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];

            if !options_done && token == END_OF_OPTIONS {
                trace!("end of options");
                options_done = true;
                i += 1;
                continue;
            }

            if !options_done && args.is_flag(token) {
                i = self.consume_optional(tokens, i)?;
                continue;
            }

            if remainder_at == Some(self.pool.len()) {
                self.pool.extend_from_slice(&tokens[i..]);
                break;
            }

            if !options_done {
                if let Some((name, app)) = self.dispatch(token)? {
                    self.command = Some((name, app, tokens[i + 1..].to_vec()));
                    break;
                }
            }

            self.pool.push(token.clone());
            i += 1;

            if remainder_at == Some(self.pool.len()) {
                self.pool.extend_from_slice(&tokens[i..]);
                break;
            }
        }

        Ok(())
    }

    /// Handle the flag at `tokens[i]`, returning the index of the next
    /// unconsumed token.
    fn consume_optional(&mut self, tokens: &[String], i: usize) -> Result<usize> {
        let args = self.args();
        let token = &tokens[i];

        let matches = match args.resolve_flag(token) {
            Ok(matches) => matches,
            Err(Error::UnknownFlag { .. }) if self.known_only => {
                trace!(flag = %token, "unknown flag");
                self.extras.push(token.clone());
                return Ok(i + 1);
            }
            Err(e) => return Err(e),
        };

        let mut next = i + 1;

        for m in matches {
            let arg = self.arg(m.index);

            debug!(
                token = %token,
                flag = %m.flag,
                dest = %arg.get_dest(),
                "flag"
            );

            self.note_seen(m.index)?;

            if !arg.consumes_argument() {
                if let Some(value) = m.value {
                    return Err(Error::UnexpectedValue {
                        arg: arg.textual_name(),
                        value,
                    });
                }

                arg.get_action()
                    .run(arg, &mut self.attrs, Some(m.flag.as_str()), None)?;

                continue;
            }

            let arity = arg.arity();
            let mut raw: Vec<String> = m.value.into_iter().collect();

            if arity == Arity::Remainder {
                raw.extend_from_slice(&tokens[next..]);
                next = tokens.len();
            } else {
                let max = arity.max().unwrap_or(usize::MAX);

                while next < tokens.len() && raw.len() < max && !self.ends_values(&tokens[next]) {
                    raw.push(tokens[next].clone());
                    next += 1;
                }
            }

            if raw.len() < arity.min() {
                return Err(Error::InsufficientTokens {
                    arg: arg.textual_name(),
                    needed: arity.min(),
                    available: raw.len(),
                });
            }

            let value = if raw.is_empty() && arity == Arity::Optional {
                arg.get_constant().cloned().unwrap_or_default()
            } else {
                convert(arg, &raw)?
            };

            arg.get_action()
                .run(arg, &mut self.attrs, Some(m.flag.as_str()), Some(value))?;
        }

        Ok(next)
    }

    fn ends_values(&self, token: &str) -> bool {
        token == END_OF_OPTIONS || self.args().is_flag(token)
    }

    fn note_seen(&mut self, index: usize) -> Result<()> {
        let arg = self.arg(index);

        self.seen.insert(index);

        let group = match arg.get_group() {
            Some(group) => group,
            None => return Ok(()),
        };

        if let Some(other) = self.used_groups.get(&group).copied() {
            if other != index {
                return Err(Error::MutuallyExclusive {
                    arg: arg.textual_name(),
                    other: self.arg(other).textual_name(),
                });
            }
        }

        self.used_groups.insert(group, index);

        Ok(())
    }

    /// Decide whether the positional token selects a sub-command.
    ///
    /// Once the pool holds the minimum owed to the positional arguments,
    /// a token naming a sub-command selects it; once the pool holds their
    /// maximum, the token must name one.
    fn dispatch(&self, token: &str) -> Result<Option<(&'a str, &'a App)>> {
        let args = self.args();

        let subcommands = match args.subcommands() {
            Some(subcommands) => subcommands,
            None => return Ok(None),
        };

        let (min, max) = positional_bounds(args);
        let pooled = self.pool.len();
        let abbrev = args.settings().abbrev();

        if pooled < min {
            return Ok(None);
        }

        if pooled >= max {
            let index = subcommands.resolve(token, abbrev)?;

            return Ok(Some(subcommands.entry(index)));
        }

        Ok(subcommands
            .lookup(token, abbrev)
            .map(|index| subcommands.entry(index)))
    }

    fn finish(mut self) -> Result<(Namespace, Vec<String>)> {
        self.assign_positionals()?;

        if let Some((name, app, rest)) = self.command.take() {
            self.run_subcommand(name, app, rest)?;
        } else if let Some(subcommands) = self.args().subcommands() {
            return Err(Error::MissingSubcommand {
                valid: subcommands.names(),
            });
        }

        self.check_required()?;

        trace!(attrs = %self.attrs, "parsed");

        Ok((self.attrs, self.extras))
    }

    fn assign_positionals(&mut self) -> Result<()> {
        let args = self.args();
        let indices = args.positional_indices();

        let arities: Vec<Arity> = indices
            .iter()
            .filter_map(|i| args.get(*i))
            .map(Arg::arity)
            .collect();

        let ranges = match partition(&arities, self.pool.len()) {
            Ok(ranges) => ranges,
            Err(Mismatch::Surplus { start }) if self.known_only => {
                self.extras.extend(self.pool.drain(start..));

                partition(&arities, start)
                    .map_err(|m| mismatch_error(args, indices, &self.pool, m))?
            }
            Err(m) => return Err(mismatch_error(args, indices, &self.pool, m)),
        };

        debug!(
            tokens = self.pool.len(),
            counts = ?ranges.iter().map(|r| r.len()).collect::<Vec<usize>>(),
            "positionals"
        );

        for (slot, range) in ranges.into_iter().enumerate() {
            let index = indices[slot];
            let arg = self.arg(index);

            if range.is_empty() && arg.arity().min() == 0 {
                continue;
            }

            let value = convert(arg, &self.pool[range])?;

            self.seen.insert(index);

            arg.get_action().run(arg, &mut self.attrs, None, Some(value))?;
        }

        Ok(())
    }

    fn run_subcommand(&mut self, name: &'a str, app: &'a App, rest: Vec<String>) -> Result<()> {
        debug!(command = %name, tokens = rest.len(), "sub-command");

        let (nested, extras) = app.run(rest, self.known_only)?;

        self.extras.extend(extras);

        for (key, value) in nested.iter() {
            if nested.is_explicit(key) {
                self.attrs.set(key.as_str(), value.clone());
            } else {
                self.attrs.set_default(key, value.clone());
            }
        }

        if let Some(dest) = self.args().subcommands().and_then(|s| s.get_dest()) {
            self.attrs.set(dest, name);
        }

        self.apply_parser_defaults();

        Ok(())
    }

    fn check_required(&self) -> Result<()> {
        let args = self.args();

        for (index, arg) in args.iter().enumerate() {
            if !arg.is_positional() && arg.is_required() && !self.seen.contains(&index) {
                return Err(Error::MissingRequiredArgument {
                    arg: arg.textual_name(),
                });
            }
        }

        for (group, members) in args.required_groups() {
            if !self.used_groups.contains_key(&group) {
                return Err(Error::MissingRequiredGroup { args: members });
            }
        }

        Ok(())
    }
}

/// Convert the tokens assigned to an argument: a single value for scalar
/// arities, otherwise a list.
fn convert(arg: &Arg, raw: &[String]) -> Result<Value> {
    if arg.arity().is_scalar() {
        return match raw.first() {
            Some(token) => convert_one(arg, token),
            None => Ok(Value::Null),
        };
    }

    raw.iter()
        .map(|token| convert_one(arg, token))
        .collect::<Result<Vec<Value>>>()
        .map(Value::List)
}

fn convert_one(arg: &Arg, raw: &str) -> Result<Value> {
    let value = arg
        .get_converter()
        .convert(raw)
        .map_err(|cause| Error::Conversion {
            arg: arg.textual_name(),
            value: raw.into(),
            cause,
        })?;

    if let Some(choice) = arg.get_choices() {
        if !choice.contains(&value) {
            return Err(Error::ChoiceViolation {
                arg: arg.textual_name(),
                value: raw.into(),
                allowed: choice.textual_format(),
            });
        }
    }

    if let Some(verification) = arg.get_verification() {
        let path = value.as_path().unwrap_or_else(|| Path::new(raw));

        verification
            .verify(path)
            .map_err(|failure| Error::VerificationFailure {
                arg: arg.textual_name(),
                value: raw.into(),
                check: failure.check,
                group: failure.group,
            })?;
    }

    Ok(value)
}

fn mismatch_error(args: &Args, indices: &[usize], pool: &[String], mismatch: Mismatch) -> Error {
    match mismatch {
        Mismatch::Short {
            index,
            needed,
            available,
        } => {
            let arg = indices
                .get(index)
                .and_then(|i| args.get(*i))
                .map(Arg::textual_name)
                .unwrap_or_default();

            if available == 0 {
                Error::MissingRequiredArgument { arg }
            } else {
                Error::InsufficientTokens {
                    arg,
                    needed,
                    available,
                }
            }
        }
        Mismatch::Surplus { start } => Error::ExtraPositionalTokens {
            tokens: pool[start..].to_vec(),
        },
    }
}

/// Minimum and maximum number of tokens the positional arguments take
/// together.
fn positional_bounds(args: &Args) -> (usize, usize) {
    args.positionals().fold((0, 0), |(min, max), arg| {
        let arity = arg.arity();

        (
            min + arity.min(),
            arity.max().map_or(usize::MAX, |m| max.saturating_add(m)),
        )
    })
}

/// Number of positional tokens after which a remainder positional argument
/// takes every remaining token.
fn remainder_position(args: &Args) -> Option<usize> {
    let mut count = 0;

    for arg in args.positionals() {
        let arity = arg.arity();

        if arity == Arity::Remainder {
            return Some(count);
        }

        count += arity.max()?;
    }

    None
}
