// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Classification of raw tokens into flags and positional values.

/// Default prefix alphabet.
pub const DEFAULT_PREFIX_CHARS: &str = "-";

/// Result of classifying a single token.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Classification {
    /// The token selects an optional argument.
    pub is_flag_like: bool,
    /// The token is a long flag (`--foo`, or `-foo`).
    pub is_long_flag: bool,
    /// Length in bytes of the token once the prefix run is removed.
    pub stripped_len: usize,
}

/// The prefix alphabet of one parser level.
///
/// A token is flag-like iff it starts with one or more characters from the
/// alphabet *and* something remains once they are stripped. A token made
/// only of prefix characters (`-`, `--`) is a positional value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prefix {
    chars: String,
}

impl Default for Prefix {
    fn default() -> Self {
        Prefix::new(DEFAULT_PREFIX_CHARS)
    }
}

impl Prefix {
    /// Create a classifier for the specified prefix alphabet.
    pub fn new(chars: &str) -> Self {
        Prefix {
            chars: chars.into(),
        }
    }

    /// The prefix alphabet.
    pub fn chars(&self) -> &str {
        &self.chars
    }

    /// First character of the alphabet, used to build the help flags.
    pub fn first(&self) -> Option<char> {
        self.chars.chars().next()
    }

    /// Number of leading prefix characters, in chars.
    pub fn run_len(&self, token: &str) -> usize {
        token
            .chars()
            .take_while(|c| self.chars.contains(*c))
            .count()
    }

    fn run_bytes(&self, token: &str) -> usize {
        token
            .char_indices()
            .find(|(_, c)| !self.chars.contains(*c))
            .map(|(i, _)| i)
            .unwrap_or_else(|| token.len())
    }

    /// Classify a token.
    pub fn classify(&self, token: &str) -> Classification {
        let run = self.run_len(token);
        let stripped_len = token.len() - self.run_bytes(token);

        if run == 0 || stripped_len == 0 {
            return Classification {
                is_flag_like: false,
                is_long_flag: false,
                stripped_len,
            };
        }

        let stripped_chars = token.chars().count() - run;

        Classification {
            is_flag_like: true,
            is_long_flag: run >= 2 || stripped_chars > 1,
            stripped_len,
        }
    }

    /// Returns `true` if the token selects an optional argument.
    pub fn is_flag_like(&self, token: &str) -> bool {
        self.classify(token).is_flag_like
    }

    /// Returns `true` for flag-like tokens that are long flags.
    pub fn is_long_flag(&self, token: &str) -> bool {
        self.classify(token).is_long_flag
    }

    /// Returns `true` for flag-like tokens starting with exactly one prefix
    /// character; only these are candidates for short flag clustering
    /// (`-abc`).
    pub fn is_single_prefixed(&self, token: &str) -> bool {
        self.is_flag_like(token) && self.run_len(token) == 1
    }

    /// Remove the prefix run from a flag-like token. Tokens that are not
    /// flag-like are returned unchanged.
    pub fn strip<'t>(&self, token: &'t str) -> &'t str {
        if self.is_flag_like(token) {
            &token[self.run_bytes(token)..]
        } else {
            token
        }
    }
}

/// Returns `true` for tokens shaped like a negative number (`-1`, `-2.5`,
/// `-.5`).
pub fn looks_like_negative_number(token: &str) -> bool {
    let rest = match token.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => rest,
        _ => return false,
    };

    let mut parts = rest.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();

    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());

    match fraction {
        None => !whole.is_empty() && digits(whole),
        Some(fraction) => !fraction.is_empty() && digits(whole) && digits(fraction),
    }
}
