// Copyright (c) 2021 James O. D. Hunt.
//
// SPDX-License-Identifier: Apache-2.0
//

//! Arity ("nargs") of an argument and the positional matcher.
//!
//! Positional tokens are pooled in command-line order (tokens separated by
//! flags still belong to the same pool) and then partitioned between the
//! declared positional arguments:
//!
//! - every argument takes as many tokens as it can, up to its maximum,
//! - while leaving enough tokens for the minimums owed to every argument
//!   declared after it.
//!
//! So `[ZeroOrMore, Fixed(1)]` given `a b c` assigns `a b` and `c`.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{Error, Result};

/// How many tokens one argument consumes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Arity {
    /// Exactly `n` tokens.
    Fixed(usize),
    /// Zero or one token (`?`).
    Optional,
    /// Any number of tokens (`*`).
    ZeroOrMore,
    /// At least one token (`+`).
    OneOrMore,
    /// Every remaining token, flag-like or not (`...`).
    Remainder,
}

impl Default for Arity {
    fn default() -> Self {
        Arity::Fixed(1)
    }
}

impl Arity {
    /// Minimum number of tokens.
    pub fn min(&self) -> usize {
        match self {
            Arity::Fixed(n) => *n,
            Arity::OneOrMore => 1,
            Arity::Optional | Arity::ZeroOrMore | Arity::Remainder => 0,
        }
    }

    /// Maximum number of tokens, `None` when unbounded.
    pub fn max(&self) -> Option<usize> {
        match self {
            Arity::Fixed(n) => Some(*n),
            Arity::Optional => Some(1),
            Arity::ZeroOrMore | Arity::OneOrMore | Arity::Remainder => None,
        }
    }

    /// Returns `true` if the converted value is a single value rather than
    /// a list (the maximum is one token).
    pub fn is_scalar(&self) -> bool {
        matches!(self, Arity::Fixed(1) | Arity::Optional)
    }

    /// Returns `true` if there is no upper bound.
    pub fn is_unbounded(&self) -> bool {
        self.max().is_none()
    }

    fn allows(&self, count: usize) -> bool {
        count >= self.min() && self.max().map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Optional => write!(f, "?"),
            Arity::ZeroOrMore => write!(f, "*"),
            Arity::OneOrMore => write!(f, "+"),
            Arity::Remainder => write!(f, "..."),
        }
    }
}

impl FromStr for Arity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "?" => Ok(Arity::Optional),
            "*" => Ok(Arity::ZeroOrMore),
            "+" => Ok(Arity::OneOrMore),
            "..." => Ok(Arity::Remainder),
            _ => s.parse::<usize>().map(Arity::Fixed).map_err(|_| {
                Error::DeclarationConflict(format!(
                    "nargs expects a count or one of '?', '*', '+', '...': got '{}'",
                    s
                ))
            }),
        }
    }
}

/// Why a token pool could not be partitioned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mismatch {
    /// The argument at `index` could not get its minimum.
    Short {
        /// Position of the argument in the arity list.
        index: usize,
        /// Its minimum.
        needed: usize,
        /// Tokens left for it once later minimums are reserved.
        available: usize,
    },
    /// Tokens from `start` onwards exceed every argument's maximum.
    Surplus {
        /// Index of the first unassigned token.
        start: usize,
    },
}

/// Partition `available` pooled tokens between arguments with the given
/// arities (in declaration order).
///
/// Returns one token range per arity. Each argument takes as many tokens
/// as its maximum allows while reserving the minimums of the arguments
/// that follow it.
pub fn partition(arities: &[Arity], available: usize) -> Result<Vec<Range<usize>>, Mismatch> {
    let mut owed = vec![0; arities.len() + 1];

    for (i, arity) in arities.iter().enumerate().rev() {
        owed[i] = owed[i + 1] + arity.min();
    }

    let mut ranges = Vec::with_capacity(arities.len());
    let mut cursor = 0;

    for (i, arity) in arities.iter().enumerate() {
        let room = (available - cursor).saturating_sub(owed[i + 1]);

        if room < arity.min() {
            return Err(Mismatch::Short {
                index: i,
                needed: arity.min(),
                available: room,
            });
        }

        let take = arity.max().map_or(room, |max| max.min(room));

        debug_assert!(arity.allows(take));

        ranges.push(cursor..cursor + take);
        cursor += take;
    }

    if cursor < available {
        return Err(Mismatch::Surplus { start: cursor });
    }

    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_bounds() {
        #[derive(Debug)]
        struct TestData {
            arity: Arity,
            min: usize,
            max: Option<usize>,
            scalar: bool,
            display: &'static str,
        }

        let tests = &[
            TestData {
                arity: Arity::Fixed(0),
                min: 0,
                max: Some(0),
                scalar: false,
                display: "0",
            },
            TestData {
                arity: Arity::Fixed(1),
                min: 1,
                max: Some(1),
                scalar: true,
                display: "1",
            },
            TestData {
                arity: Arity::Fixed(3),
                min: 3,
                max: Some(3),
                scalar: false,
                display: "3",
            },
            TestData {
                arity: Arity::Optional,
                min: 0,
                max: Some(1),
                scalar: true,
                display: "?",
            },
            TestData {
                arity: Arity::ZeroOrMore,
                min: 0,
                max: None,
                scalar: false,
                display: "*",
            },
            TestData {
                arity: Arity::OneOrMore,
                min: 1,
                max: None,
                scalar: false,
                display: "+",
            },
            TestData {
                arity: Arity::Remainder,
                min: 0,
                max: None,
                scalar: false,
                display: "...",
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let msg = format!("test[{}]: {:?}", i, d);

            assert_eq!(d.arity.min(), d.min, "{}", msg);
            assert_eq!(d.arity.max(), d.max, "{}", msg);
            assert_eq!(d.arity.is_scalar(), d.scalar, "{}", msg);
            assert_eq!(d.arity.to_string(), d.display, "{}", msg);
            assert_eq!(d.display.parse::<Arity>(), Ok(d.arity), "{}", msg);
        }

        assert_eq!(Arity::default(), Arity::Fixed(1));
        assert!("x".parse::<Arity>().is_err());
        assert!("-1".parse::<Arity>().is_err());
    }

    #[test]
    fn test_partition() {
        #[derive(Debug)]
        struct TestData {
            arities: Vec<Arity>,
            available: usize,
            result: Result<Vec<Range<usize>>, Mismatch>,
        }

        let tests = &[
            TestData {
                arities: vec![],
                available: 0,
                result: Ok(vec![]),
            },
            TestData {
                arities: vec![],
                available: 1,
                result: Err(Mismatch::Surplus { start: 0 }),
            },
            TestData {
                arities: vec![Arity::ZeroOrMore, Arity::Fixed(1)],
                available: 3,
                result: Ok(vec![0..2, 2..3]),
            },
            TestData {
                arities: vec![Arity::Fixed(1), Arity::ZeroOrMore],
                available: 3,
                result: Ok(vec![0..1, 1..3]),
            },
            TestData {
                arities: vec![Arity::OneOrMore],
                available: 2,
                result: Ok(vec![0..2]),
            },
            TestData {
                arities: vec![Arity::OneOrMore],
                available: 0,
                result: Err(Mismatch::Short {
                    index: 0,
                    needed: 1,
                    available: 0,
                }),
            },
            TestData {
                arities: vec![Arity::Optional, Arity::Fixed(1)],
                available: 1,
                result: Ok(vec![0..0, 0..1]),
            },
            TestData {
                arities: vec![Arity::Optional, Arity::Fixed(1)],
                available: 2,
                result: Ok(vec![0..1, 1..2]),
            },
            TestData {
                arities: vec![Arity::Fixed(2), Arity::Fixed(1)],
                available: 2,
                result: Err(Mismatch::Short {
                    index: 0,
                    needed: 2,
                    available: 1,
                }),
            },
            TestData {
                arities: vec![Arity::Fixed(1), Arity::Fixed(1)],
                available: 3,
                result: Err(Mismatch::Surplus { start: 2 }),
            },
            TestData {
                arities: vec![Arity::ZeroOrMore],
                available: 0,
                result: Ok(vec![0..0]),
            },
            TestData {
                arities: vec![Arity::Fixed(1), Arity::Remainder],
                available: 4,
                result: Ok(vec![0..1, 1..4]),
            },
            TestData {
                arities: vec![Arity::OneOrMore, Arity::Fixed(2), Arity::Optional],
                available: 5,
                result: Ok(vec![0..3, 3..5, 5..5]),
            },
        ];

        for (i, d) in tests.iter().enumerate() {
            let result = partition(&d.arities, d.available);

            let msg = format!("test[{}]: {:?}, result: {:?}", i, d, result);

            assert_eq!(result, d.result, "{}", msg);
        }
    }

    #[test]
    fn test_partition_fixed_consumes_exactly() {
        for n in 0..8 {
            let arities = vec![Arity::Fixed(n), Arity::ZeroOrMore];

            let ranges = partition(&arities, n).unwrap();

            let msg = format!("n: {}, ranges: {:?}", n, ranges);

            assert_eq!(ranges[0], 0..n, "{}", msg);
            assert!(ranges[1].is_empty(), "{}", msg);
        }
    }
}
