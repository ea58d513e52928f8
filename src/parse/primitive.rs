////////////////////////////////////////////////////////////////////////////////
// Parsekit
////////////////////////////////////////////////////////////////////////////////
// Copyright 2024 Parsekit Contributors
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Primitive parsers: single byte, literal string, regex match, and
//! end-of-input.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use crate::parse::combinator::{map, repeat, seq};
use crate::parse::result::Failure;
use crate::parse::result::ParseResult;
use crate::parse::result::Success;

// External library imports.
use once_cell::sync::Lazy;
use regex::Regex;

////////////////////////////////////////////////////////////////////////////////
// literal / byte
////////////////////////////////////////////////////////////////////////////////

/// Returns a parser which succeeds iff the input begins with `expect`.
#[inline]
pub fn literal<'t>(expect: &'static str)
    -> impl FnMut(&'t str) -> ParseResult<'t, &'t str>
{
    move |text| {
        if text.starts_with(expect) {
            Ok(Success {
                value: &text[..expect.len()],
                token: &text[..expect.len()],
                rest: &text[expect.len()..],
            })
        } else {
            Err(Failure::raw(text))
        }
    }
}

/// Returns a parser which succeeds iff the input begins with the char `c`,
/// equivalent to `literal` applied to the singleton string, but yielding the
/// matched char rather than a string slice.
#[inline]
pub fn byte<'t>(c: char) -> impl FnMut(&'t str) -> ParseResult<'t, char> {
    move |text| {
        if text.starts_with(c) {
            let len = c.len_utf8();
            Ok(Success { value: c, token: &text[..len], rest: &text[len..] })
        } else {
            Err(Failure::raw(text))
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// regex
////////////////////////////////////////////////////////////////////////////////

/// Returns a parser which succeeds iff `re` matches starting exactly at the
/// current offset. Patterns are expected to be anchored with a leading `^`,
/// which anchors to the start of the slice passed in (i.e. the current
/// parse position), not the start of the original input.
#[inline]
pub fn regex<'t>(re: &'static Regex)
    -> impl FnMut(&'t str) -> ParseResult<'t, &'t str>
{
    move |text| {
        match re.find(text) {
            Some(m) if m.start() == 0 => Ok(Success {
                value: &text[..m.end()],
                token: &text[..m.end()],
                rest: &text[m.end()..],
            }),
            _ => Err(Failure::raw(text)),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// end_of_input
////////////////////////////////////////////////////////////////////////////////

/// Succeeds with an empty token iff there is no remaining input.
#[inline]
pub fn end_of_input<'t>(text: &'t str) -> ParseResult<'t, &'t str> {
    if text.is_empty() {
        Ok(Success { value: "", token: "", rest: text })
    } else {
        Err(Failure::raw(text))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Convenience parsers.
////////////////////////////////////////////////////////////////////////////////

/// Parses a single ASCII digit, yielding its numeric value.
#[inline]
pub fn digit<'t>(text: &'t str) -> ParseResult<'t, u32> {
    match text.chars().next() {
        Some(c) if c.is_ascii_digit() => {
            let len = c.len_utf8();
            Ok(Success {
                value: c.to_digit(10).expect("ascii digit"),
                token: &text[..len],
                rest: &text[len..],
            })
        }
        _ => Err(Failure::raw(text)),
    }
}

/// Parses one or more digits, folding them left-to-right into a
/// non-negative integer.
#[inline]
pub fn digits<'t>(text: &'t str) -> ParseResult<'t, u64> {
    map(seq(digit, repeat(digit)), |(first, rest)| {
        rest.into_iter().fold(u64::from(first), |acc, d| acc * 10 + u64::from(d))
    })(text)
}

static NUMBER_PATTERN: &str =
    r"^(-?)(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?(0|[1-9][0-9]*))?";

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(NUMBER_PATTERN).expect("valid number regex"));

/// Parses a JSON-compatible signed decimal number: optional leading `-`, a
/// mandatory integer part with no superfluous leading zero, an optional
/// fractional part, and an optional exponent.
#[inline]
pub fn number<'t>(text: &'t str) -> ParseResult<'t, f64> {
    match regex(&NUMBER_RE)(text) {
        Ok(success) => match success.token.parse::<f64>() {
            Ok(value) => Ok(success.map_value(|_| value)),
            Err(_) => Err(Failure::raw(text)),
        },
        Err(failure) => Err(failure),
    }
}

static SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t\r\n]*").expect("valid spaces regex"));

/// Matches zero or more whitespace characters. Always succeeds.
#[inline]
pub fn spaces<'t>(text: &'t str) -> ParseResult<'t, &'t str> {
    regex(&SPACES_RE)(text)
}
