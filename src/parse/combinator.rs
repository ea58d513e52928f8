////////////////////////////////////////////////////////////////////////////////
// Parsekit
////////////////////////////////////////////////////////////////////////////////
// Copyright 2024 Parsekit Contributors
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! Parser combinators: sequencing, alternation, transformation, repetition,
//! and error-message shaping.
////////////////////////////////////////////////////////////////////////////////

// Local imports.
use crate::parse::primitive::end_of_input;
use crate::parse::primitive::spaces;
use crate::parse::result::Failure;
use crate::parse::result::ParseResult;
use crate::parse::result::ParseResultExt as _;
use crate::parse::result::Success;

////////////////////////////////////////////////////////////////////////////////
// Sequencing.
////////////////////////////////////////////////////////////////////////////////

/// Runs `p`, then `q` at the position `p` left off at, yielding both values
/// as a pair. If `q` fails after `p` consumed any input, the failure is
/// committed -- this is the central invariant of the whole engine (see
/// `spec.md` §4.1.2).
pub fn seq<'t, F, G, V, U>(mut p: F, mut q: G)
    -> impl FnMut(&'t str) -> ParseResult<'t, (V, U)>
    where
        F: FnMut(&'t str) -> ParseResult<'t, V>,
        G: FnMut(&'t str) -> ParseResult<'t, U>,
{
    move |text| {
        let left = p(text)?;
        let left_consumed = left.consumed() > 0;
        q(left.rest)
            .commit_if(left_consumed)
            .map(|right| left.join_with(right, text, |l, r| (l, r)))
    }
}

/// `seq` discarding the left value (the `~>` combinator).
pub fn seq_drop_left<'t, F, G, V, U>(p: F, q: G)
    -> impl FnMut(&'t str) -> ParseResult<'t, U>
    where
        F: FnMut(&'t str) -> ParseResult<'t, V>,
        G: FnMut(&'t str) -> ParseResult<'t, U>,
{
    map(seq(p, q), |(_, r)| r)
}

/// `seq` discarding the right value (the `<~` combinator).
pub fn seq_drop_right<'t, F, G, V, U>(p: F, q: G)
    -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where
        F: FnMut(&'t str) -> ParseResult<'t, V>,
        G: FnMut(&'t str) -> ParseResult<'t, U>,
{
    map(seq(p, q), |(l, _)| l)
}

////////////////////////////////////////////////////////////////////////////////
// Alternation.
////////////////////////////////////////////////////////////////////////////////

/// Ordered choice (the `|` combinator). Tries `p`; on an uncommitted
/// failure, tries `q` at the original position instead. A committed failure
/// from `p` is returned as-is, without trying `q`.
pub fn alt<'t, F, G, V>(mut p: F, mut q: G)
    -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where
        F: FnMut(&'t str) -> ParseResult<'t, V>,
        G: FnMut(&'t str) -> ParseResult<'t, V>,
{
    move |text| {
        match p(text) {
            Ok(success) => Ok(success),
            Err(failure) if failure.committed => Err(failure),
            Err(_) => q(text),
        }
    }
}

/// Demotes a committed failure from `p` to uncommitted, letting a
/// surrounding `alt` try its fallback branch regardless of how much of `p`
/// had already matched. The only way to request unbounded lookahead.
pub fn attempt<'t, F, V>(mut p: F) -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    move |text| {
        match p(text) {
            Err(mut failure) if failure.committed => {
                failure.committed = false;
                Err(failure)
            }
            other => other,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Transformation.
////////////////////////////////////////////////////////////////////////////////

/// Runs `p`, applying `f` to a successful value. Failures pass through
/// unchanged.
pub fn map<'t, F, V, U>(mut p: F, mut f: impl FnMut(V) -> U)
    -> impl FnMut(&'t str) -> ParseResult<'t, U>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    move |text| p(text).map_value(&mut f)
}

/// Monadic continuation: runs `p`, constructs `q = f(value)` from its
/// result, and runs `q` at the advanced position. If `p` consumed any
/// input, the combined outcome is committed regardless of `q`'s own flag --
/// entering the continuation is itself a commitment. A zero-consumption `p`
/// leaves the commit flag to `q`, so `attempt`-wrapped prefixes still allow
/// fallback.
pub fn bind<'t, F, V, G, U>(mut p: F, mut f: impl FnMut(V) -> G)
    -> impl FnMut(&'t str) -> ParseResult<'t, U>
    where
        F: FnMut(&'t str) -> ParseResult<'t, V>,
        G: FnMut(&'t str) -> ParseResult<'t, U>,
{
    move |text| {
        let left = p(text)?;
        let left_consumed = left.consumed() > 0;
        let mut cont = f(left.value);
        cont(left.rest)
            .commit_if(left_consumed)
            .map(|right| Success {
                value: right.value,
                token: &text[.. left.token.len() + right.token.len()],
                rest: right.rest,
            })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Error message shaping.
////////////////////////////////////////////////////////////////////////////////

/// On failure, replaces the message with `msg`.
pub fn label<'t, F, V>(msg: impl Into<String>, mut p: F)
    -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    let msg = msg.into();
    move |text| p(text).map_err(|mut failure| { failure.message = msg.clone(); failure })
}

/// On failure, appends `msg` to the existing message.
pub fn tag<'t, F, V>(msg: impl Into<String>, mut p: F)
    -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    let msg = msg.into();
    move |text| p(text).map_err(|mut failure| { failure.message.push_str(&msg); failure })
}

/// On failure, replaces the message with `msg` only if the existing message
/// is empty -- promotes a bare primitive miss to grammar-level phrasing
/// without trampling a more specific diagnostic raised further inside.
pub fn map_failure<'t, F, V>(msg: impl Into<String>, mut p: F)
    -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    let msg = msg.into();
    move |text| p(text).map_err(|mut failure| {
        if failure.message.is_empty() {
            failure.message = msg.clone();
        }
        failure
    })
}

/// Renders a failure into the final user-facing diagnostic string:
/// `Error (<offset>): Found '<c>' but <message>`. Intended to wrap the
/// grammar exactly once, at the top-level `parse` call.
pub fn render_diagnostic<'t, F, V>(mut p: F)
    -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    move |text| p(text).map_err(|failure| {
        let byte_offset = text.len() - failure.pos.len();
        let char_offset = text[..byte_offset].chars().count();
        let found = failure.pos.chars().next()
            .map(|c| c.to_string())
            .unwrap_or_default();
        Failure {
            message: format!("Error ({}): Found '{}' but {}",
                char_offset, found, failure.message),
            pos: failure.pos,
            committed: failure.committed,
        }
    })
}

////////////////////////////////////////////////////////////////////////////////
// Repetition.
////////////////////////////////////////////////////////////////////////////////

/// Zero or more successive successes of `p`. Always succeeds; stops at the
/// first failure of `p`, discarding it. Uses an explicit loop rather than
/// recursion so arbitrarily long input does not grow the call stack.
///
/// If `p` ever succeeds while consuming nothing, the loop cannot terminate;
/// callers are responsible for avoiding that grammar shape (`spec.md`
/// §4.1.5). In debug builds, a zero-consumption success is asserted against
/// before it turns into a hang.
pub fn repeat<'t, F, V>(mut p: F) -> impl FnMut(&'t str) -> ParseResult<'t, Vec<V>>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    move |text| {
        let mut values = Vec::new();
        let mut rest = text;
        loop {
            match p(rest) {
                Ok(success) => {
                    debug_assert!(!success.token.is_empty(),
                        "repeat: parser succeeded without consuming input");
                    if success.token.is_empty() {
                        break;
                    }
                    rest = success.rest;
                    values.push(success.value);
                }
                Err(_) => break,
            }
        }
        let consumed = text.len() - rest.len();
        Ok(Success { value: values, token: &text[..consumed], rest })
    }
}

/// Exactly `n` consecutive successes of `p`; fails on the `k`-th failure
/// (`0 <= k < n`) the way a length-`n` `seq` chain would -- if any prior
/// repetition consumed input, the failure is committed. Yields the empty
/// sequence immediately when `n == 0`.
pub fn repeat_n<'t, F, V>(n: usize, mut p: F)
    -> impl FnMut(&'t str) -> ParseResult<'t, Vec<V>>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    move |text| {
        if n == 0 {
            return Ok(Success { value: Vec::new(), token: "", rest: text });
        }

        let mut values = Vec::with_capacity(n);
        let mut rest = text;
        for _ in 0..n {
            match p(rest) {
                Ok(success) => {
                    rest = success.rest;
                    values.push(success.value);
                }
                Err(failure) => {
                    let consumed_so_far = text.len() - rest.len();
                    return Err(failure).commit_if(consumed_so_far > 0);
                }
            }
        }
        let consumed = text.len() - rest.len();
        Ok(Success { value: values, token: &text[..consumed], rest })
    }
}

/// Zero or more `p`s separated by `sep`, with no trailing separator:
/// probes `p` once; if it fails uncommitted, yields an empty sequence, the
/// same fallback discipline `alt` uses; a committed failure on that first
/// probe propagates instead of being swallowed. Otherwise repeats `sep ~>
/// p` with `repeat`.
///
/// The empty result resumes from the failed probe's own position rather
/// than rewinding all the way back to `text`: an uncommitted failure can
/// still have consumed leading lubricant (e.g. `trim_spaces`'s whitespace)
/// before the grammar itself failed to match, and that progress is real,
/// not a grammar-level attempt to undo.
pub fn list<'t, F, G, V, U>(mut p: F, mut sep: G)
    -> impl FnMut(&'t str) -> ParseResult<'t, Vec<V>>
    where
        F: FnMut(&'t str) -> ParseResult<'t, V>,
        G: FnMut(&'t str) -> ParseResult<'t, U>,
{
    move |text| {
        let first = match p(text) {
            Ok(success) => success,
            Err(failure) if !failure.committed => {
                let consumed = text.len() - failure.pos.len();
                return Ok(Success {
                    value: Vec::new(),
                    token: &text[.. consumed],
                    rest: failure.pos,
                });
            }
            Err(failure) => return Err(failure),
        };

        let rest_items = repeat(seq_drop_left(&mut sep, &mut p))(first.rest)
            .expect("repeat always succeeds");

        let mut values = Vec::with_capacity(1 + rest_items.value.len());
        values.push(first.value);
        values.extend(rest_items.value);

        Ok(Success {
            value: values,
            token: &text[.. first.token.len() + rest_items.token.len()],
            rest: rest_items.rest,
        })
    }
}

/// Parses `left`, then `p`, then `right`, yielding `p`'s value. A failing
/// `right` is committed by the ordinary sequencing rule, so a mismatched
/// closing delimiter is reported in context rather than silently abandoned
/// by an outer `alt`.
pub fn enclose<'t, L, R, F, V, A, B>(left: L, right: R, p: F)
    -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where
        L: FnMut(&'t str) -> ParseResult<'t, A>,
        R: FnMut(&'t str) -> ParseResult<'t, B>,
        F: FnMut(&'t str) -> ParseResult<'t, V>,
{
    seq_drop_left(left, seq_drop_right(p, right))
}

/// Skips `skip` before and after `p`, yielding `p`'s value.
///
/// Does not route the leading skip through `seq`'s generic commit rule:
/// consuming whitespace is not a grammar-level commitment, so a failure of
/// `p` keeps whatever `committed` value `p` itself produced rather than
/// being forced to `true` just because some whitespace was skipped first.
pub fn trim<'t, S, F, V, U>(mut skip: S, mut p: F)
    -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where
        S: FnMut(&'t str) -> ParseResult<'t, U>,
        F: FnMut(&'t str) -> ParseResult<'t, V>,
{
    move |text| {
        let leading = skip(text)?;
        let inner = p(leading.rest)?;
        let trailing = skip(inner.rest)?;
        Ok(Success {
            value: inner.value,
            token: &text[.. leading.token.len() + inner.token.len() + trailing.token.len()],
            rest: trailing.rest,
        })
    }
}

/// `trim` with whitespace as the skipped parser.
pub fn trim_spaces<'t, F, V>(p: F) -> impl FnMut(&'t str) -> ParseResult<'t, V>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    trim(spaces, p)
}

////////////////////////////////////////////////////////////////////////////////
// Top-level driver.
////////////////////////////////////////////////////////////////////////////////

/// Pairs `grammar` with end-of-input and wraps it in `render_diagnostic`,
/// then runs it against `input`. On success returns the value; on failure
/// returns the single rendered diagnostic string.
pub fn parse<'t, F, V>(mut grammar: F, input: &'t str) -> Result<V, String>
    where F: FnMut(&'t str) -> ParseResult<'t, V>
{
    let mut top = render_diagnostic(seq_drop_right(
        &mut grammar,
        label("there should be no trailing characters", end_of_input)));

    match top(input) {
        Ok(success) => Ok(success.value),
        Err(failure) => Err(failure.message),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::primitive::byte;
    use crate::parse::primitive::literal;

    #[test]
    fn seq_runs_both_in_order() {
        let mut p = seq(byte('a'), byte('b'));
        let success = p("ab rest").unwrap();
        assert_eq!(success.value, ('a', 'b'));
        assert_eq!(success.rest, " rest");
    }

    #[test]
    fn seq_commits_after_left_consumption() {
        let mut p = seq(byte('a'), byte('b'));
        let failure = p("ac").unwrap_err();
        assert!(failure.committed);
    }

    #[test]
    fn seq_uncommitted_when_left_fails() {
        let mut p = seq(byte('a'), byte('b'));
        let failure = p("xc").unwrap_err();
        assert!(!failure.committed);
    }

    #[test]
    fn alt_falls_back_on_uncommitted_failure() {
        let mut p = alt(literal("true"), literal("false"));
        assert_eq!(p("false").unwrap().value, "false");
    }

    #[test]
    fn alt_does_not_fall_back_on_committed_failure() {
        // `ab|b` ~ `a ~ c` commits once `a` is consumed, so the alternative
        // `b` branch is never tried even though it would otherwise match.
        let mut p = alt(seq(byte('a'), byte('b')), map(byte('b'), |c| (c, c)));
        let failure = p("ac").unwrap_err();
        assert!(failure.committed);
    }

    #[test]
    fn attempt_clears_commit_for_fallback() {
        let mut p = alt(
            attempt(seq(byte('a'), byte('b'))),
            map(byte('a'), |c| (c, c)));
        let success = p("ac").unwrap();
        assert_eq!(success.value, ('a', 'a'));
    }

    #[test]
    fn map_preserves_consumed() {
        let mut p = map(literal("hi"), |s| s.len());
        let success = p("hi there").unwrap();
        assert_eq!(success.value, 2);
        assert_eq!(success.token, "hi");
    }

    #[test]
    fn bind_chains_dependent_parsers() {
        let mut p = bind(digit_count, |n| repeat_n(n as usize, byte('x')));
        let success = p("2xxy").unwrap();
        assert_eq!(success.value, vec!['x', 'x']);
        assert_eq!(success.rest, "y");
    }

    fn digit_count<'t>(text: &'t str) -> ParseResult<'t, u32> {
        crate::parse::primitive::digit(text)
    }

    #[test]
    fn label_replaces_message() {
        let mut p = label("expected a boolean", literal("true"));
        let failure = p("nope").unwrap_err();
        assert_eq!(failure.message, "expected a boolean");
    }

    #[test]
    fn tag_appends_message() {
        let mut p = tag(" (in object)", label("expected value", literal("true")));
        let failure = p("nope").unwrap_err();
        assert_eq!(failure.message, "expected value (in object)");
    }

    #[test]
    fn map_failure_only_replaces_when_empty() {
        let mut p = map_failure("outer", label("inner", literal("true")));
        assert_eq!(p("x").unwrap_err().message, "inner");

        let mut q = map_failure("outer", literal("true"));
        assert_eq!(q("x").unwrap_err().message, "outer");
    }

    #[test]
    fn render_diagnostic_formats_offset_and_char() {
        let mut p = render_diagnostic(literal("true"));
        let failure = p("xy").unwrap_err();
        assert_eq!(failure.message, "Error (0): Found 'x' but ");
    }

    #[test]
    fn repeat_never_fails_and_is_greedy() {
        let mut p = repeat(byte('a'));
        let success = p("aaab").unwrap();
        assert_eq!(success.value, vec!['a', 'a', 'a']);
        assert_eq!(success.rest, "b");

        let success = p("b").unwrap();
        assert_eq!(success.value, Vec::<char>::new());
        assert_eq!(success.rest, "b");
    }

    #[test]
    fn repeat_n_succeeds_on_exact_count() {
        let mut p = repeat_n(3, byte('a'));
        let success = p("aaab").unwrap();
        assert_eq!(success.value, vec!['a', 'a', 'a']);
        assert_eq!(success.rest, "b");
    }

    #[test]
    fn repeat_n_fails_short_of_count() {
        let mut p = repeat_n(3, byte('a'));
        assert!(p("aab").is_err());
    }

    #[test]
    fn repeat_n_zero_always_succeeds_empty() {
        let mut p: _ = repeat_n::<_, char>(0, byte('a'));
        let success = p("zzz").unwrap();
        assert_eq!(success.value, Vec::<char>::new());
        assert_eq!(success.rest, "zzz");
    }

    #[test]
    fn list_parses_separated_items() {
        let mut p = list(digit, byte(','));
        let success = p("1,2,3x").unwrap();
        assert_eq!(success.value, vec![1, 2, 3]);
        assert_eq!(success.rest, "x");
    }

    fn digit<'t>(text: &'t str) -> ParseResult<'t, u32> {
        crate::parse::primitive::digit(text)
    }

    #[test]
    fn list_of_empty_input_consumes_nothing() {
        let mut p = list(digit, byte(','));
        let success = p("").unwrap();
        assert_eq!(success.value, Vec::<u32>::new());
        assert_eq!(success.token, "");
        assert_eq!(success.rest, "");
    }

    #[test]
    fn list_does_not_allow_trailing_separator() {
        let mut p = list(digit, byte(','));
        let success = p("1,2,x").unwrap();
        assert_eq!(success.value, vec![1, 2]);
        assert_eq!(success.rest, ",x");
    }

    #[test]
    fn list_propagates_a_committed_first_failure() {
        // `item` consumes a digit then unconditionally fails on the byte
        // that follows, so the first probe fails committed (it consumed
        // input before failing). `list` must not swallow that into an
        // empty match the way it does an uncommitted non-match.
        fn item<'t>(text: &'t str) -> ParseResult<'t, (u32, char)> {
            seq(digit, byte('!'))(text)
        }
        let mut p = list(item, byte(','));
        let failure = p("1,2").unwrap_err();
        assert!(failure.committed);
    }

    #[test]
    fn list_resumes_from_the_failed_probe_position_on_an_uncommitted_miss() {
        // The probe is wrapped in `trim_spaces`, so a non-matching first
        // item still consumes leading whitespace before failing. `list`'s
        // empty result should land right after that whitespace, not back
        // at the untouched original text.
        let mut p = list(trim_spaces(digit), byte(','));
        let success = p("  x").unwrap();
        assert_eq!(success.value, Vec::<u32>::new());
        assert_eq!(success.rest, "x");
    }

    #[test]
    fn enclose_yields_inner_value() {
        let mut p = enclose(byte('('), byte(')'), digit);
        let success = p("(4)rest").unwrap();
        assert_eq!(success.value, 4);
        assert_eq!(success.rest, "rest");
    }

    #[test]
    fn enclose_commits_on_missing_close() {
        let mut p = enclose(byte('('), byte(')'), digit);
        let failure = p("(4x").unwrap_err();
        assert!(failure.committed);
    }

    #[test]
    fn trim_spaces_skips_both_sides() {
        let mut p = trim_spaces(literal("abc"));
        let success = p("  abc  rest").unwrap();
        assert_eq!(success.value, "abc");
        assert_eq!(success.rest, "rest");
    }

    #[test]
    fn trim_spaces_failure_is_not_committed_by_the_leading_skip() {
        // Skipping leading whitespace must not itself force a commit on
        // `p`'s failure; otherwise an enclosing `alt` could never fall
        // back past whitespace-only input.
        let mut p = trim_spaces(literal("abc"));
        let failure = p("   xyz").unwrap_err();
        assert!(!failure.committed);
    }

    #[test]
    fn parse_rejects_trailing_characters() {
        let result = parse(literal("abc"), "abcdef");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("no trailing characters"));
    }

    #[test]
    fn parse_returns_value_on_full_match() {
        let result = parse(literal("abc"), "abc");
        assert_eq!(result.unwrap(), "abc");
    }
}
