use winnow::ascii::multispace0;
use winnow::combinator::{cut_err, opt};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::stream::Stream;
use winnow::token::{any, literal, one_of, take, take_while};

use crate::parser::Input;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

pub(crate) fn ident<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    // First character must be alphabetic, `_` or `$` (not digit).
    if !input.starts_with(is_ident_start) {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    take_while(1.., is_ident_continue).parse_next(input)
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Single- or double-quoted string with backslash escapes.
pub(crate) fn quoted_string(input: &mut Input<'_>) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut out = String::new();
    loop {
        let c = cut_err(any)
            .context(StrContext::Expected(StrContextValue::Description(
                "closing quote",
            )))
            .parse_next(input)?;
        if c == quote {
            break;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = cut_err(any)
            .context(StrContext::Expected(StrContextValue::Description(
                "escape sequence",
            )))
            .parse_next(input)?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'u' => out.push(unicode_escape(input)?),
            other => out.push(other),
        }
    }
    Ok(out)
}

fn unicode_escape(input: &mut Input<'_>) -> ModalResult<char> {
    let hex = cut_err(take(4usize))
        .context(StrContext::Expected(StrContextValue::Description(
            "four hex digits",
        )))
        .parse_next(input)?;
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| ErrMode::Cut(ContextError::new()))
}

// ---------------------------------------------------------------------------
// Whitespace
// ---------------------------------------------------------------------------

/// Skip insignificant whitespace.
pub(crate) fn ws_skip(input: &mut Input<'_>) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

// ---------------------------------------------------------------------------
// Keyword matching with word boundary
// ---------------------------------------------------------------------------

/// Match an exact keyword string, ensuring it's not a prefix of a longer
/// identifier (i.e. the next character cannot continue an identifier).
pub(crate) fn kw<'a>(keyword: &'static str) -> impl FnMut(&mut Input<'a>) -> ModalResult<()> {
    move |input: &mut Input<'a>| {
        let saved = input.checkpoint();
        literal(keyword).parse_next(input)?;
        if input.starts_with(is_ident_continue) {
            input.reset(&saved);
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Number literal
// ---------------------------------------------------------------------------

/// Parse a number literal: integer, float, optional exponent.
pub(crate) fn number_literal(input: &mut Input<'_>) -> ModalResult<f64> {
    let integer_part = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut text = integer_part.to_string();

    // `1.` followed by an identifier is member access on a number, not a float
    let saved = input.checkpoint();
    if opt(literal(".")).parse_next(input)?.is_some() {
        match opt(take_while(1.., |c: char| c.is_ascii_digit())).parse_next(input)? {
            Some(frac_part) => {
                text.push('.');
                text.push_str(frac_part);
            }
            None => input.reset(&saved),
        }
    }

    let saved = input.checkpoint();
    if opt(one_of(['e', 'E'])).parse_next(input)?.is_some() {
        let sign = opt(one_of(['+', '-'])).parse_next(input)?;
        match opt(take_while(1.., |c: char| c.is_ascii_digit())).parse_next(input)? {
            Some(exp) => {
                text.push('e');
                if let Some(sign) = sign {
                    text.push(sign);
                }
                text.push_str(exp);
            }
            None => input.reset(&saved),
        }
    }

    text.parse::<f64>()
        .map_err(|_| ErrMode::Cut(ContextError::new()))
}
