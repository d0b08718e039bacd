use serde_json::Value;

use epd_lang::render_literal;

use super::executor::ExpressionExecutor;
use super::segment::BoolOp;
use crate::error::{DetectResult, expression_error};

/// A resolved segment or the operator that followed it.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Value(Option<Value>),
    Op(BoolOp),
}

/// Render resolved pieces back into an expression of literals and operators.
pub fn recompose(pieces: &[Piece]) -> String {
    pieces
        .iter()
        .map(|piece| match piece {
            Piece::Value(v) => render_literal(v.as_ref()),
            Piece::Op(op) => op.as_str().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce resolved pieces to the rule's final value. A lone segment is used
/// as-is; anything longer is recomposed and handed to the executor's boolean
/// evaluator, whose precedence and short-circuiting apply.
pub fn reduce(pieces: &[Piece], executor: &dyn ExpressionExecutor) -> DetectResult<Option<Value>> {
    if let [Piece::Value(single)] = pieces {
        return Ok(single.clone());
    }
    executor
        .parse_expression(&recompose(pieces))
        .map_err(expression_error)
}
