////////////////////////////////////////////////////////////////////////////////
// Parsekit
////////////////////////////////////////////////////////////////////////////////
// Copyright 2024 Parsekit Contributors
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Parser results.
////////////////////////////////////////////////////////////////////////////////


////////////////////////////////////////////////////////////////////////////////
// ParseResult
////////////////////////////////////////////////////////////////////////////////
/// The outcome of a parse attempt: either a `Success` carrying a value and the
/// consumed token, or a `Failure` carrying a diagnostic message, the position
/// the failure was raised at, and the commit flag that governs backtracking
/// in [`alt`](crate::parse::alt).
pub type ParseResult<'t, V> = Result<Success<'t, V>, Failure<'t>>;

/// Extension methods for [`ParseResult`].
pub trait ParseResultExt<'t, V>: Sized {
    /// Applies the given closure to a successful value, leaving failures
    /// unchanged.
    fn map_value<F, U>(self, f: F) -> ParseResult<'t, U>
        where F: FnOnce(V) -> U;

    /// Discards the parsed value, replacing it with the consumed token.
    fn tokenize_value(self) -> ParseResult<'t, &'t str>;

    /// Marks a failure as committed if `condition` holds; a success passes
    /// through unchanged. Used to implement the sequencing commit rule (see
    /// [`seq`](crate::parse::seq)) from combinators built atop it.
    fn commit_if(self, condition: bool) -> Self;
}

impl<'t, V> ParseResultExt<'t, V> for ParseResult<'t, V> {
    fn map_value<F, U>(self, f: F) -> ParseResult<'t, U>
        where F: FnOnce(V) -> U
    {
        self.map(|success| success.map_value(f))
    }

    fn tokenize_value(self) -> ParseResult<'t, &'t str> {
        self.map(|success| {
            let token = success.token;
            success.map_value(|_| token)
        })
    }

    fn commit_if(self, condition: bool) -> Self {
        self.map_err(|mut failure| {
            if condition {
                failure.committed = true;
            }
            failure
        })
    }
}


////////////////////////////////////////////////////////////////////////////////
// Success
////////////////////////////////////////////////////////////////////////////////
/// A successful parse: the produced value, the slice of input it was parsed
/// from (`token`), and the remaining unparsed input (`rest`).
///
/// `token` and `rest` are both subslices of the same shared input buffer;
/// `consumed()` recovers the `spec.md` "consumed" count as `token.len()`.
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Success<'t, V> {
    /// The parsed value.
    pub value: V,
    /// The text consumed to produce `value`.
    pub token: &'t str,
    /// The remainder of the input.
    pub rest: &'t str,
}

impl<'t, V> Success<'t, V> {
    /// The number of input units consumed by this parse.
    pub fn consumed(&self) -> usize {
        self.token.len()
    }

    /// Applies the given closure to the parsed value.
    pub fn map_value<F, U>(self, f: F) -> Success<'t, U>
        where F: FnOnce(V) -> U
    {
        Success {
            value: f(self.value),
            token: self.token,
            rest: self.rest,
        }
    }

    /// Joins two sequential successes together, combining their values with
    /// `f` and concatenating their tokens. `text` must be the input both
    /// successes were ultimately parsed from.
    pub fn join_with<U, T, F>(self, other: Success<'t, U>, text: &'t str, f: F)
        -> Success<'t, T>
        where F: FnOnce(V, U) -> T
    {
        Success {
            value: f(self.value, other.value),
            token: &text[.. self.token.len() + other.token.len()],
            rest: other.rest,
        }
    }
}


////////////////////////////////////////////////////////////////////////////////
// Failure
////////////////////////////////////////////////////////////////////////////////
/// A failed parse.
///
/// `message` starts empty at the primitives (see `spec.md` §4.1.1) and is
/// shaped on the way out by [`label`](crate::parse::label),
/// [`tag`](crate::parse::tag), and
/// [`map_failure`](crate::parse::map_failure); `committed` is set only by
/// [`seq`](crate::parse::seq)/[`bind`](crate::parse::bind) and cleared only
/// by [`attempt`](crate::parse::attempt).
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Failure<'t> {
    /// A human-readable description of what was expected, possibly empty.
    pub message: String,
    /// The input remaining at the point the failure was raised.
    pub pos: &'t str,
    /// Whether this failure forbids the fallback branch of `alt`.
    pub committed: bool,
}

impl<'t> Failure<'t> {
    /// Constructs a raw, uncommitted failure with an empty message at the
    /// given position. This is the shape every primitive parser fails with.
    pub fn raw(pos: &'t str) -> Self {
        Failure { message: String::new(), pos, committed: false }
    }
}

impl<'t> std::fmt::Display for Failure<'t> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl<'t> std::error::Error for Failure<'t> {}
