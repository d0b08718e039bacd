mod executor;
mod matcher;
mod predicate;
mod recompose;
mod segment;
mod types;

#[cfg(test)]
mod tests;

pub use executor::{ExpressionExecutor, LangExecutor};
pub use matcher::RuleMatcher;
pub use predicate::{DEFAULT_HELPER_PREFIX, PredicateKind, PredicateResolver, ResolvedPredicate};
pub use recompose::{Piece, recompose, reduce};
pub use segment::{BoolOp, Token, split_expression};
pub use types::ProfileRule;
