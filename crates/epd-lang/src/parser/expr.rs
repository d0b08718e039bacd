use winnow::combinator::{alt, cut_err, opt, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::literal;

use crate::HELPER_QUALIFIER;
use crate::ast::*;
use crate::parse_utils::{ident, kw, number_literal, quoted_string, ws_skip};

use super::{Descent, Input};

// ---------------------------------------------------------------------------
// Public entry: full expression
// ---------------------------------------------------------------------------

pub(crate) fn parse_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    descent.step(input)?;
    or_expr.parse_next(input)
}

// ---------------------------------------------------------------------------
// Precedence levels (lowest to highest)
// ---------------------------------------------------------------------------

/// `or_expr = and_expr { "||" and_expr }`
fn or_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    let mut left = and_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        if opt(literal("||")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            let right = cut_err(and_expr).parse_next(input)?;
            descent.step(input)?;
            left = binop(BinOp::Or, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `and_expr = eq_expr { "&&" eq_expr }`
fn and_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    let mut left = eq_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        if opt(literal("&&")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            let right = cut_err(eq_expr).parse_next(input)?;
            descent.step(input)?;
            left = binop(BinOp::And, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `eq_expr = rel_expr { eq_op rel_expr }`
fn eq_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    let mut left = rel_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("===").value(BinOp::StrictEq),
            literal("!==").value(BinOp::StrictNe),
            literal("==").value(BinOp::LooseEq),
            literal("!=").value(BinOp::LooseNe),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(rel_expr).parse_next(input)?;
            descent.step(input)?;
            left = binop(op, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `rel_expr = add_expr { rel_op add_expr }`
fn rel_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    let mut left = add_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("<=").value(BinOp::Le),
            literal(">=").value(BinOp::Ge),
            literal("<").value(BinOp::Lt),
            literal(">").value(BinOp::Gt),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(add_expr).parse_next(input)?;
            descent.step(input)?;
            left = binop(op, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `add_expr = mul_expr { ("+" | "-") mul_expr }`
fn add_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    let mut left = mul_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("+").value(BinOp::Add),
            literal("-").value(BinOp::Sub),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(mul_expr).parse_next(input)?;
            descent.step(input)?;
            left = binop(op, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `mul_expr = unary_expr { ("*" | "/" | "%") unary_expr }`
fn mul_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    let mut left = unary_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("*").value(BinOp::Mul),
            literal("/").value(BinOp::Div),
            literal("%").value(BinOp::Mod),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(unary_expr).parse_next(input)?;
            descent.step(input)?;
            left = binop(op, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `unary_expr = ("!" | "-") unary_expr | postfix_expr`
fn unary_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    if opt(literal("!")).parse_next(input)?.is_some() {
        descent.step(input)?;
        ws_skip.parse_next(input)?;
        let inner = cut_err(unary_expr).parse_next(input)?;
        return Ok(Expr::Not(Box::new(inner)));
    }
    if opt(literal("-")).parse_next(input)?.is_some() {
        descent.step(input)?;
        ws_skip.parse_next(input)?;
        let inner = cut_err(unary_expr).parse_next(input)?;
        return Ok(Expr::Neg(Box::new(inner)));
    }
    postfix_expr.parse_next(input)
}

fn binop(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::BinOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

// ---------------------------------------------------------------------------
// Postfix: member access, computed access, calls
// ---------------------------------------------------------------------------

/// `postfix_expr = primary { "." ident [ call_args ] | "[" expr "]" }`
fn postfix_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut descent = Descent::new(input);
    let mut expr = primary.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;

        if opt(literal(".")).parse_next(input)?.is_some() {
            descent.step(input)?;
            ws_skip.parse_next(input)?;
            let name = cut_err(ident)
                .context(StrContext::Expected(StrContextValue::Description(
                    "property name after '.'",
                )))
                .parse_next(input)?
                .to_string();
            ws_skip.parse_next(input)?;

            if opt(literal("(")).parse_next(input)?.is_some() {
                let args = call_args.parse_next(input)?;
                expr = match expr {
                    Expr::Ident(ref q) if q == HELPER_QUALIFIER => Expr::Helper { name, args },
                    receiver => Expr::MethodCall {
                        receiver: Box::new(receiver),
                        method: name,
                        args,
                    },
                };
            } else {
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: name,
                };
            }
            continue;
        }

        if opt(literal("[")).parse_next(input)?.is_some() {
            descent.step(input)?;
            ws_skip.parse_next(input)?;
            let index = cut_err(parse_expr).parse_next(input)?;
            ws_skip.parse_next(input)?;
            cut_err(literal("]"))
                .context(StrContext::Expected(StrContextValue::Description("']'")))
                .parse_next(input)?;
            expr = Expr::Index {
                object: Box::new(expr),
                index: Box::new(index),
            };
            continue;
        }

        break;
    }
    Ok(expr)
}

/// Arguments after an opening `(`, up to and including the closing `)`.
fn call_args(input: &mut Input<'_>) -> ModalResult<Vec<Expr>> {
    ws_skip.parse_next(input)?;

    // Empty args?
    if opt(literal(")")).parse_next(input)?.is_some() {
        return Ok(vec![]);
    }

    let args: Vec<Expr> =
        separated(1.., (ws_skip, parse_expr).map(|(_, e)| e), literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")"))
        .context(StrContext::Expected(StrContextValue::Description("')'")))
        .parse_next(input)?;
    Ok(args)
}

// ---------------------------------------------------------------------------
// Primary
// ---------------------------------------------------------------------------

fn primary(input: &mut Input<'_>) -> ModalResult<Expr> {
    alt((
        // Number literal
        number_literal.map(Expr::Number),
        // String literal
        quoted_string.map(Expr::StringLit),
        // Keyword literals (word-boundary checked)
        kw("true").map(|_| Expr::Bool(true)),
        kw("false").map(|_| Expr::Bool(false)),
        kw("null").map(|_| Expr::Null),
        kw("undefined").map(|_| Expr::Undefined),
        paren_expr,
        array_literal,
        object_literal,
        ident.map(|name: &str| Expr::Ident(name.to_string())),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn paren_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    literal("(").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let inner = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")")).parse_next(input)?;
    Ok(inner)
}

fn array_literal(input: &mut Input<'_>) -> ModalResult<Expr> {
    literal("[").parse_next(input)?;
    ws_skip.parse_next(input)?;
    if opt(literal("]")).parse_next(input)?.is_some() {
        return Ok(Expr::Array(vec![]));
    }
    let items: Vec<Expr> =
        separated(1.., (ws_skip, parse_expr).map(|(_, e)| e), literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal("]"))
        .context(StrContext::Expected(StrContextValue::Description("']'")))
        .parse_next(input)?;
    Ok(Expr::Array(items))
}

fn object_literal(input: &mut Input<'_>) -> ModalResult<Expr> {
    literal("{").parse_next(input)?;
    ws_skip.parse_next(input)?;
    if opt(literal("}")).parse_next(input)?.is_some() {
        return Ok(Expr::Object(vec![]));
    }
    let entries: Vec<(String, Expr)> =
        separated(1.., object_entry, literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal("}"))
        .context(StrContext::Expected(StrContextValue::Description("'}'")))
        .parse_next(input)?;
    Ok(Expr::Object(entries))
}

/// `key: value` where key is an identifier or a quoted string.
fn object_entry(input: &mut Input<'_>) -> ModalResult<(String, Expr)> {
    ws_skip.parse_next(input)?;
    let key = cut_err(alt((
        quoted_string,
        ident.map(|name: &str| name.to_string()),
    )))
    .context(StrContext::Expected(StrContextValue::Description(
        "object key",
    )))
    .parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(":"))
        .context(StrContext::Expected(StrContextValue::Description("':'")))
        .parse_next(input)?;
    ws_skip.parse_next(input)?;
    let value = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    Ok((key, value))
}
