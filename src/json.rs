////////////////////////////////////////////////////////////////////////////////
// Parsekit
////////////////////////////////////////////////////////////////////////////////
// Copyright 2024 Parsekit Contributors
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! A recursive-descent JSON parser built atop the combinator core, producing
//! a tagged value tree.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use crate::parse::alt;
use crate::parse::byte;
use crate::parse::enclose;
use crate::parse::list;
use crate::parse::literal;
use crate::parse::map;
use crate::parse::map_failure;
use crate::parse::number;
use crate::parse::regex;
use crate::parse::seq;
use crate::parse::seq_drop_right;
use crate::parse::trim_spaces;
use crate::parse::ParseResult;

// External library imports.
use once_cell::sync::Lazy;
use regex::Regex;

// Standard library imports.
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// JsonValue
////////////////////////////////////////////////////////////////////////////////

/// A parsed JSON value.
///
/// Objects are kept as an ordered list of key/value pairs rather than an
/// unordered map -- the source's `Map` loses key order, and consumers that
/// care about it are better served by a list-of-pairs; see `DESIGN.md`.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    /// The JSON `null` literal.
    Null,
    /// A JSON boolean.
    Bool(bool),
    /// A JSON number, always represented as `f64`.
    Number(f64),
    /// A JSON string, with escapes already decoded.
    String(String),
    /// A JSON array, in source order.
    Array(Vec<JsonValue>),
    /// A JSON object, in source order. Duplicate keys keep only the last
    /// occurrence's value, at the position of the key's first appearance --
    /// last-write-wins overwrites in place during parsing.
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// Looks up a key in an `Object` value, returning `None` for any other
    /// variant or a missing key.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(pairs) => pairs.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// parse_json
////////////////////////////////////////////////////////////////////////////////

/// Parses a complete RFC-8259-subset JSON text into a [`JsonValue`], or
/// a [`ParseKitError::Diagnostic`](crate::error::ParseKitError) describing
/// the first failure.
pub fn parse_json(text: &str) -> Result<JsonValue, crate::error::ParseKitError> {
    log::trace!("parsing {} bytes of JSON", text.len());
    crate::parse::parse(value, text).map_err(Into::into)
}

////////////////////////////////////////////////////////////////////////////////
// Grammar.
////////////////////////////////////////////////////////////////////////////////

/// `value ::= null | bool | number | string | array | object`, trimmed of
/// surrounding whitespace.
pub fn value<'t>(text: &'t str) -> ParseResult<'t, JsonValue> {
    trim_spaces(map_failure("illegal start of JSON value",
        alt(json_null,
        alt(json_bool,
        alt(json_number,
        alt(json_string,
        alt(json_array,
            json_object)))))))
        (text)
}

fn json_null<'t>(text: &'t str) -> ParseResult<'t, JsonValue> {
    map(literal("null"), |_| JsonValue::Null)(text)
}

fn json_bool<'t>(text: &'t str) -> ParseResult<'t, JsonValue> {
    alt(
        map(literal("true"), |_| JsonValue::Bool(true)),
        map(literal("false"), |_| JsonValue::Bool(false)))
        (text)
}

fn json_number<'t>(text: &'t str) -> ParseResult<'t, JsonValue> {
    map(number, JsonValue::Number)(text)
}

fn json_string<'t>(text: &'t str) -> ParseResult<'t, JsonValue> {
    map(string_literal, JsonValue::String)(text)
}

fn json_array<'t>(text: &'t str) -> ParseResult<'t, JsonValue> {
    map(
        enclose(
            byte('['),
            map_failure("expected ']'", byte(']')),
            list(value, trim_spaces(byte(',')))),
        JsonValue::Array)
        (text)
}

fn json_object<'t>(text: &'t str) -> ParseResult<'t, JsonValue> {
    map(
        enclose(
            byte('{'),
            map_failure("expected '}'", byte('}')),
            list(pair, trim_spaces(byte(',')))),
        |pairs| JsonValue::Object(dedup_last_wins(pairs)))
        (text)
}

fn pair<'t>(text: &'t str) -> ParseResult<'t, (String, JsonValue)> {
    seq(
        seq_drop_right(trim_spaces(string_literal), trim_spaces(byte(':'))),
        value)
        (text)
}

/// Overwrites earlier values for duplicate keys in place, keeping the
/// position of the key's *first* appearance but the *last* assigned value.
fn dedup_last_wins(pairs: Vec<(String, JsonValue)>) -> Vec<(String, JsonValue)> {
    let mut result: Vec<(String, JsonValue)> = Vec::with_capacity(pairs.len());
    for (key, val) in pairs {
        if let Some(existing) = result.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = val;
        } else {
            result.push((key, val));
        }
    }
    result
}

static STRING_BODY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:[^"\\]|\\["\\/bfnrtu])*"#).expect("valid string body regex")
});

/// `'"' <body> '"'` where body matches `(?:[^"\\]|\\[\\"/bfnrtu])*`, with
/// recognized escapes (including `\uXXXX`, decoded to the corresponding
/// code point with surrogate-pair support) replaced by their literal
/// characters.
fn string_literal<'t>(text: &'t str) -> ParseResult<'t, String> {
    map(
        seq(byte('"'), seq_drop_right(regex(&STRING_BODY_RE), byte('"'))),
        |(_, body)| decode_escapes(body))
        (text)
}

/// Replaces JSON escape sequences in a raw (still-escaped) string body with
/// their literal characters, including `\uXXXX` / surrogate pairs.
fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let high = take_hex4(&mut chars);
                if (0xD800..=0xDBFF).contains(&high) {
                    // Possible high surrogate: look for a following \uXXXX
                    // low surrogate and combine into one code point.
                    let mut lookahead = chars.clone();
                    if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                        let low = take_hex4(&mut lookahead);
                        if (0xDC00..=0xDFFF).contains(&low) {
                            chars = lookahead;
                            let code = 0x10000
                                + (high - 0xD800) * 0x400
                                + (low - 0xDC00);
                            if let Some(ch) = char::from_u32(code) {
                                out.push(ch);
                                continue;
                            }
                        }
                    }
                    out.push('\u{FFFD}');
                } else if let Some(ch) = char::from_u32(high) {
                    out.push(ch);
                } else {
                    out.push('\u{FFFD}');
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn take_hex4(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u32 {
    let mut code = 0u32;
    for _ in 0..4 {
        if let Some(c) = chars.next() {
            code = code * 16 + c.to_digit(16).unwrap_or(0);
        }
    }
    code
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValue::Null => write!(f, "null"),
            JsonValue::Bool(b) => write!(f, "{}", b),
            JsonValue::Number(n) => write!(f, "{}", n),
            JsonValue::String(s) => write!(f, "{:?}", s),
            JsonValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { write!(f, ",")?; }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            JsonValue::Object(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 { write!(f, ",")?; }
                    write!(f, "{:?}:{}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}
