use serde_json::Value;

use epd_lang::LangResult;

/// Evaluation primitive used by the rule matcher.
///
/// `execute` resolves one atomic predicate against an event; `parse_expression`
/// reduces a recomposed boolean string (literals joined by `&&` / `||`) to a
/// value. `Ok(None)` stands for `undefined`.
pub trait ExpressionExecutor: Send + Sync {
    fn execute(&self, expression: &str, event: &Value) -> LangResult<Option<Value>>;

    fn parse_expression(&self, expression: &str) -> LangResult<Option<Value>> {
        epd_lang::evaluate_standalone(expression)
    }
}

/// [`ExpressionExecutor`] backed by the `epd-lang` evaluator.
#[derive(Debug, Default, Clone, Copy)]
pub struct LangExecutor;

impl ExpressionExecutor for LangExecutor {
    fn execute(&self, expression: &str, event: &Value) -> LangResult<Option<Value>> {
        epd_lang::evaluate(expression, event)
    }
}
