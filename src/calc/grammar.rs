////////////////////////////////////////////////////////////////////////////////
// Parsekit
////////////////////////////////////////////////////////////////////////////////
// Copyright 2024 Parsekit Contributors
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Expression tree and precedence-climbing grammar.
//!
//! ```text
//! expr   ::= term   ( ('+' | '-') term )*
//! term   ::= factor ( ('*' | '/') factor )*
//! factor ::= number
//!          | '(' expr ')'
//!          | '-' number
//!          | '-' '(' expr ')'
//!          | '-' expr
//! ```
//!
//! The driver strips all whitespace before handing input to `expr`, so none
//! of these rules need to skip it themselves.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use crate::parse::alt;
use crate::parse::attempt;
use crate::parse::byte;
use crate::parse::enclose;
use crate::parse::map;
use crate::parse::regex;
use crate::parse::repeat;
use crate::parse::seq;
use crate::parse::seq_drop_left;
use crate::parse::Failure;
use crate::parse::ParseResult;

// External library imports.
use once_cell::sync::Lazy;
use regex::Regex;

////////////////////////////////////////////////////////////////////////////////
// Expr / Op
////////////////////////////////////////////////////////////////////////////////

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Times,
    /// `/`
    Div,
}

/// An arithmetic expression tree.
///
/// There is no dedicated unary-negation variant; `-x` is encoded as
/// `BinOp(Times, x, Number(-1.0))` to keep the variant set minimal.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal number.
    Number(f64),
    /// A binary operation over two subexpressions.
    BinOp(Op, Box<Expr>, Box<Expr>),
}

impl Expr {
    fn negate(self) -> Expr {
        Expr::BinOp(Op::Times, Box::new(self), Box::new(Expr::Number(-1.0)))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Grammar.
////////////////////////////////////////////////////////////////////////////////

/// `term ( ('+' | '-') term )*`, left-associatively folded.
pub fn expr<'t>(text: &'t str) -> ParseResult<'t, Expr> {
    map(
        seq(term, repeat(seq(add_op, term))),
        |(first, rest)| fold_left(first, rest))
        (text)
}

/// `factor ( ('*' | '/') factor )*`, left-associatively folded.
pub fn term<'t>(text: &'t str) -> ParseResult<'t, Expr> {
    map(
        seq(factor, repeat(seq(mul_op, factor))),
        |(first, rest)| fold_left(first, rest))
        (text)
}

fn fold_left(first: Expr, rest: Vec<(Op, Expr)>) -> Expr {
    rest.into_iter().fold(first, |acc, (op, operand)| {
        Expr::BinOp(op, Box::new(acc), Box::new(operand))
    })
}

fn add_op<'t>(text: &'t str) -> ParseResult<'t, Op> {
    alt(
        map(byte('+'), |_| Op::Plus),
        map(byte('-'), |_| Op::Minus))
        (text)
}

fn mul_op<'t>(text: &'t str) -> ParseResult<'t, Op> {
    alt(
        map(byte('*'), |_| Op::Times),
        map(byte('/'), |_| Op::Div))
        (text)
}

static UNSIGNED_NUMBER_PATTERN: &str =
    r"^(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?(0|[1-9][0-9]*))?";

static UNSIGNED_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(UNSIGNED_NUMBER_PATTERN).expect("valid number regex"));

/// An unsigned decimal number -- like `parse::number`, but without the
/// optional leading `-`. Negation is handled entirely by `factor`'s
/// unary-minus branches, so the two must not compete for the same `-`.
fn unsigned_number<'t>(text: &'t str) -> ParseResult<'t, f64> {
    match regex(&UNSIGNED_NUMBER_RE)(text) {
        Ok(success) => match success.token.parse::<f64>() {
            Ok(value) => Ok(success.map_value(|_| value)),
            Err(_) => Err(Failure::raw(text)),
        },
        Err(failure) => Err(failure),
    }
}

/// `number | '(' expr ')' | '-' number | '-' '(' expr ')' | '-' expr`.
///
/// The two `'-' ...` branches that name a specific continuation are wrapped
/// in `attempt`: they share a leading `-` with every other unary-minus
/// branch, so without it the commit from consuming that `-` would block the
/// ordered fallback `alt` depends on to reach the next variant.
pub fn factor<'t>(text: &'t str) -> ParseResult<'t, Expr> {
    alt(map(unsigned_number, Expr::Number),
    alt(parenthesized,
    alt(attempt(map(seq_drop_left(byte('-'), unsigned_number), |n| Expr::Number(n).negate())),
    alt(attempt(map(seq_drop_left(byte('-'), parenthesized), Expr::negate)),
        map(seq_drop_left(byte('-'), factor), Expr::negate)))))
        (text)
}

fn parenthesized<'t>(text: &'t str) -> ParseResult<'t, Expr> {
    enclose(byte('('), byte(')'), expr)(text)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn parses_left_associative_subtraction() {
        let tree = parse(expr, "5-2-1").unwrap();
        assert_eq!(tree, Expr::BinOp(Op::Minus,
            Box::new(Expr::BinOp(Op::Minus,
                Box::new(Expr::Number(5.0)),
                Box::new(Expr::Number(2.0)))),
            Box::new(Expr::Number(1.0))));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let tree = parse(expr, "2+3*4").unwrap();
        assert_eq!(tree, Expr::BinOp(Op::Plus,
            Box::new(Expr::Number(2.0)),
            Box::new(Expr::BinOp(Op::Times,
                Box::new(Expr::Number(3.0)),
                Box::new(Expr::Number(4.0))))));
    }

    #[test]
    fn parentheses_override_precedence() {
        let tree = parse(expr, "(2+3)*4").unwrap();
        assert_eq!(tree, Expr::BinOp(Op::Times,
            Box::new(Expr::BinOp(Op::Plus,
                Box::new(Expr::Number(2.0)),
                Box::new(Expr::Number(3.0)))),
            Box::new(Expr::Number(4.0))));
    }

    #[test]
    fn unary_minus_on_number() {
        let tree = parse(expr, "-5").unwrap();
        assert_eq!(tree, Expr::Number(5.0).negate());
    }

    #[test]
    fn unary_minus_on_group() {
        let tree = parse(expr, "-(1+2)").unwrap();
        assert_eq!(tree, Expr::BinOp(Op::Plus,
            Box::new(Expr::Number(1.0)),
            Box::new(Expr::Number(2.0))).negate());
    }

    #[test]
    fn double_negation() {
        let tree = parse(expr, "--1").unwrap();
        assert_eq!(tree, Expr::Number(1.0).negate().negate());
    }
}
