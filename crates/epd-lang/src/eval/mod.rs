use serde_json::{Map, Value};

use crate::ast::{BinOp, Expr};
use crate::error::{LangError, LangResult};
use crate::parser::parse_expression;
use crate::value::{
    is_truthy, loose_equals, number_value, strict_equals, to_display_string, to_number,
};

mod helpers;
mod methods;


/// Identifier that resolves to the whole event when the event has no field
/// of that name.
const EVENT_IDENT: &str = "event";

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Parse `expression` and evaluate it against `event`.
///
/// `Ok(None)` is `undefined`: the expression referenced something the event
/// does not have.
pub fn evaluate(expression: &str, event: &Value) -> LangResult<Option<Value>> {
    let expr = parse_expression(expression)?;
    eval_expr(&expr, event)
}

/// Evaluate an expression with no event in scope; every identifier is
/// `undefined`. Used to reduce recomposed boolean strings.
pub fn evaluate_standalone(expression: &str) -> LangResult<Option<Value>> {
    evaluate(expression, &Value::Null)
}

/// Evaluate a parsed expression against an event.
pub(crate) fn eval_expr(expr: &Expr, event: &Value) -> LangResult<Option<Value>> {
    match expr {
        Expr::Number(n) => Ok(number_value(*n)),
        Expr::StringLit(s) => Ok(Some(Value::String(s.clone()))),
        Expr::Bool(b) => Ok(Some(Value::Bool(*b))),
        Expr::Null => Ok(Some(Value::Null)),
        Expr::Undefined => Ok(None),
        Expr::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                // `undefined` inside an array literal serialises as null
                out.push(eval_expr(item, event)?.unwrap_or(Value::Null));
            }
            Ok(Some(Value::Array(out)))
        }
        Expr::Object(entries) => {
            let mut map = Map::new();
            for (key, item) in entries {
                if let Some(v) = eval_expr(item, event)? {
                    map.insert(key.clone(), v);
                }
            }
            Ok(Some(Value::Object(map)))
        }
        Expr::Ident(name) => Ok(resolve_ident(name, event)),
        Expr::Member { object, property } => {
            let target = eval_expr(object, event)?;
            Ok(member(target.as_ref(), property))
        }
        Expr::Index { object, index } => {
            let target = eval_expr(object, event)?;
            let key = eval_expr(index, event)?;
            Ok(index_value(target.as_ref(), key.as_ref()))
        }
        Expr::Helper { name, args } => {
            let values = eval_args(args, event)?;
            helpers::call_helper(name, &values)
        }
        Expr::MethodCall {
            receiver,
            method,
            args,
        } => {
            let target = eval_expr(receiver, event)?;
            let values = eval_args(args, event)?;
            methods::call_method(target.as_ref(), method, &values)
        }
        Expr::Not(inner) => {
            let v = eval_expr(inner, event)?;
            Ok(Some(Value::Bool(!is_truthy(v.as_ref()))))
        }
        Expr::Neg(inner) => {
            let v = eval_expr(inner, event)?;
            Ok(number_value(-to_number(v.as_ref())))
        }
        Expr::BinOp { op, left, right } => eval_binop(*op, left, right, event),
    }
}

fn eval_args(args: &[Expr], event: &Value) -> LangResult<Vec<Option<Value>>> {
    args.iter().map(|a| eval_expr(a, event)).collect()
}

// ---------------------------------------------------------------------------
// Identifier & member resolution
// ---------------------------------------------------------------------------

fn resolve_ident(name: &str, event: &Value) -> Option<Value> {
    if let Some(v) = event.get(name) {
        return Some(v.clone());
    }
    if name == EVENT_IDENT && event.is_object() {
        return Some(event.clone());
    }
    None
}

/// `target.property`; access through `null`/`undefined` yields `undefined`.
pub(crate) fn member(target: Option<&Value>, property: &str) -> Option<Value> {
    match target? {
        Value::Object(map) => map.get(property).cloned(),
        Value::Array(items) => {
            if property == "length" {
                Some(Value::from(items.len()))
            } else {
                property
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).cloned())
            }
        }
        Value::String(s) => {
            if property == "length" {
                Some(Value::from(s.chars().count()))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn index_value(target: Option<&Value>, key: Option<&Value>) -> Option<Value> {
    match (target?, key?) {
        (Value::Array(items), Value::Number(n)) => {
            let i = n.as_f64()?;
            if i < 0.0 || i.fract() != 0.0 {
                return None;
            }
            items.get(i as usize).cloned()
        }
        (Value::String(s), Value::Number(n)) => {
            let i = n.as_f64()?;
            if i < 0.0 || i.fract() != 0.0 {
                return None;
            }
            s.chars().nth(i as usize).map(|c| Value::String(c.to_string()))
        }
        (target, key) => member(Some(target), &to_display_string(Some(key))),
    }
}

// ---------------------------------------------------------------------------
// Binary operators
// ---------------------------------------------------------------------------

fn eval_binop(op: BinOp, left: &Expr, right: &Expr, event: &Value) -> LangResult<Option<Value>> {
    // Logical operators short-circuit and yield an operand, not a bool.
    match op {
        BinOp::And => {
            let lv = eval_expr(left, event)?;
            if !is_truthy(lv.as_ref()) {
                return Ok(lv);
            }
            return eval_expr(right, event);
        }
        BinOp::Or => {
            let lv = eval_expr(left, event)?;
            if is_truthy(lv.as_ref()) {
                return Ok(lv);
            }
            return eval_expr(right, event);
        }
        _ => {}
    }

    let lv = eval_expr(left, event)?;
    let rv = eval_expr(right, event)?;
    let (l, r) = (lv.as_ref(), rv.as_ref());

    let out = match op {
        BinOp::StrictEq => Some(Value::Bool(strict_equals(l, r))),
        BinOp::StrictNe => Some(Value::Bool(!strict_equals(l, r))),
        BinOp::LooseEq => Some(Value::Bool(loose_equals(l, r))),
        BinOp::LooseNe => Some(Value::Bool(!loose_equals(l, r))),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => Some(Value::Bool(compare(op, l, r))),
        BinOp::Add => match (l, r) {
            (Some(Value::String(_)), _) | (_, Some(Value::String(_))) => Some(Value::String(
                to_display_string(l) + &to_display_string(r),
            )),
            _ => number_value(to_number(l) + to_number(r)),
        },
        BinOp::Sub => number_value(to_number(l) - to_number(r)),
        BinOp::Mul => number_value(to_number(l) * to_number(r)),
        BinOp::Div => number_value(to_number(l) / to_number(r)),
        BinOp::Mod => number_value(to_number(l) % to_number(r)),
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    };
    Ok(out)
}

fn compare(op: BinOp, l: Option<&Value>, r: Option<&Value>) -> bool {
    if let (Some(Value::String(a)), Some(Value::String(b))) = (l, r) {
        return match op {
            BinOp::Lt => a < b,
            BinOp::Gt => a > b,
            BinOp::Le => a <= b,
            BinOp::Ge => a >= b,
            _ => false,
        };
    }
    let (a, b) = (to_number(l), to_number(r));
    match op {
        BinOp::Lt => a < b,
        BinOp::Gt => a > b,
        BinOp::Le => a <= b,
        BinOp::Ge => a >= b,
        _ => false,
    }
}

pub(crate) fn unknown_method(method: &str, receiver: &'static str) -> LangError {
    LangError::UnknownMethod {
        method: method.to_string(),
        receiver,
    }
}
