use std::cell::Cell;

use winnow::combinator::{cut_err, fail};
use winnow::error::StrContext;
use winnow::prelude::*;
use winnow::stream::Stateful;

mod expr;

use crate::ast::Expr;
use crate::error::{LangError, LangResult};
use crate::parse_utils::ws_skip;


/// Deepest expression tree the parser will build. Every nested
/// sub-expression, prefix operator and chained operator or accessor counts
/// one level, so evaluation recursion is bounded by the same figure.
pub const MAX_NESTING: usize = 256;

/// Parser input: the remaining text plus the shared nesting counter.
pub(crate) type Input<'i> = Stateful<&'i str, &'i Nesting>;

#[derive(Debug, Default)]
pub(crate) struct Nesting {
    depth: Cell<usize>,
}

/// Levels taken from [`Nesting`] by one parser frame, returned on drop so
/// backtracking and errors leave the counter balanced.
pub(crate) struct Descent<'i> {
    nesting: &'i Nesting,
    taken: usize,
}

impl<'i> Descent<'i> {
    pub(crate) fn new(input: &Input<'i>) -> Self {
        Self {
            nesting: input.state,
            taken: 0,
        }
    }

    /// Take one more level, failing hard once [`MAX_NESTING`] is reached.
    pub(crate) fn step(&mut self, input: &mut Input<'i>) -> ModalResult<()> {
        let depth = self.nesting.depth.get();
        if depth >= MAX_NESTING {
            return cut_err(fail)
                .context(StrContext::Label("nesting depth"))
                .parse_next(input);
        }
        self.nesting.depth.set(depth + 1);
        self.taken += 1;
        Ok(())
    }
}

impl Drop for Descent<'_> {
    fn drop(&mut self) {
        let depth = self.nesting.depth.get();
        self.nesting.depth.set(depth - self.taken);
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Parse a complete predicate expression. Trailing input is an error, as is
/// nesting deeper than [`MAX_NESTING`].
pub fn parse_expression(input: &str) -> LangResult<Expr> {
    let nesting = Nesting::default();
    let stream = Input {
        input,
        state: &nesting,
    };
    full_expr.parse(stream).map_err(|e| LangError::Parse {
        expression: input.to_string(),
        message: format!("at offset {}: {}", e.offset(), e.inner()),
    })
}

fn full_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    ws_skip.parse_next(input)?;
    let expr = expr::parse_expr.parse_next(input)?;
    ws_skip.parse_next(input)?;
    Ok(expr)
}
