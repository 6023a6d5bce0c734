// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

use indexmap::IndexMap;

use crate::app::App;
use crate::error::{Error, Result};

/// A set of sub-commands, each with its own nested [App].
///
/// # Example
///
/// ```
/// use argmatch::{App, Arg, Args, Subcommands};
///
/// let mut add = Args::new();
/// add.add(Arg::new(&["--name"])).unwrap();
///
/// let mut commands = Subcommands::new().dest("command");
/// commands.add("add", &["a"], App::new("add").args(add)).unwrap();
/// commands.add("remove", &["rm"], App::new("remove")).unwrap();
///
/// assert_eq!(commands.format_short_syntax(), "{add,remove}");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Subcommands {
    dest: Option<String>,
    help: Option<String>,

    /// Name or alias to index into `commands`.
    names: IndexMap<String, usize>,

    /// Primary name and parser of each command.
    commands: Vec<(String, App)>,
}

impl Subcommands {
    /// Create an empty set of sub-commands.
    pub fn new() -> Self {
        Subcommands::default()
    }

    /// Store the primary name of the chosen command under this key.
    pub fn dest(self, dest: &str) -> Self {
        Subcommands {
            dest: Some(dest.into()),
            ..self
        }
    }

    /// Specify the help text for the sub-commands.
    pub fn help(self, help: &str) -> Self {
        Subcommands {
            help: Some(help.into()),
            ..self
        }
    }

    /// Register a command and its aliases.
    ///
    /// Fails with [Error::DeclarationConflict] if the name or an alias is
    /// already in use.
    pub fn add(&mut self, name: &str, aliases: &[&str], app: App) -> Result<()> {
        let index = self.commands.len();

        let mut all = vec![name];
        all.extend_from_slice(aliases);

        for (i, n) in all.iter().enumerate() {
            if self.names.contains_key(*n) || all[..i].contains(n) {
                return Err(Error::DeclarationConflict(format!(
                    "conflicting sub-command name: {}",
                    n
                )));
            }
        }

        for n in all {
            self.names.insert(n.into(), index);
        }

        self.commands.push((name.into(), app));

        Ok(())
    }

    /// The destination key, if any.
    pub fn get_dest(&self) -> Option<&str> {
        self.dest.as_deref()
    }

    /// The help text, if any.
    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Primary names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.commands.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Returns the command at the specified index.
    pub fn get(&self, index: usize) -> Option<(&str, &App)> {
        self.commands.get(index).map(|(n, a)| (n.as_str(), a))
    }

    pub(crate) fn entry(&self, index: usize) -> (&str, &App) {
        let (name, app) = &self.commands[index];

        (name.as_str(), app)
    }

    /// Returns `true` if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Usage text: the primary names, `{add,remove}`.
    pub fn format_short_syntax(&self) -> String {
        format!("{{{}}}", self.names().join(","))
    }

    /// Resolve the token to a command index.
    ///
    /// An exact name or alias wins. Otherwise, if `abbrev` is set, a prefix
    /// matching the names of a single command resolves to it.
    pub fn resolve(&self, token: &str, abbrev: bool) -> Result<usize> {
        if let Some(index) = self.names.get(token) {
            return Ok(*index);
        }

        let candidates = if abbrev {
            self.candidates(token)
        } else {
            Vec::new()
        };

        match candidates.len() {
            0 => Err(Error::InvalidSubcommand {
                command: token.into(),
                valid: self.names(),
            }),
            1 => Ok(candidates[0].1),
            _ => Err(Error::AmbiguousSubcommand {
                command: token.into(),
                candidates: candidates.into_iter().map(|(n, _)| n).collect(),
            }),
        }
    }

    /// Like [Subcommands::resolve] but returns `None` instead of failing.
    pub fn lookup(&self, token: &str, abbrev: bool) -> Option<usize> {
        self.resolve(token, abbrev).ok()
    }

    /// Names (and aliases) the token is a strict prefix of, one per
    /// command, sorted.
    fn candidates(&self, token: &str) -> Vec<(String, usize)> {
        let mut seen = Vec::new();
        let mut candidates: Vec<(String, usize)> = Vec::new();

        let mut matching: Vec<(&String, &usize)> = self
            .names
            .iter()
            .filter(|(n, _)| n.len() > token.len() && n.starts_with(token))
            .collect();

        matching.sort();

        for (name, index) in matching {
            if !seen.contains(index) {
                seen.push(*index);
                candidates.push((name.clone(), *index));
            }
        }

        candidates
    }
}
