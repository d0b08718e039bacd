use serde_json::Value;

use super::executor::ExpressionExecutor;
use super::predicate::PredicateResolver;
use super::recompose::{Piece, reduce};
use super::segment::{Token, split_expression};
use super::types::ProfileRule;
use crate::error::DetectResult;

/// Evaluates profile rules against single events.
pub struct RuleMatcher<'a> {
    executor: &'a dyn ExpressionExecutor,
    resolver: &'a PredicateResolver,
}

impl<'a> RuleMatcher<'a> {
    pub fn new(executor: &'a dyn ExpressionExecutor, resolver: &'a PredicateResolver) -> Self {
        Self { executor, resolver }
    }

    /// Names of the rules `event` satisfies, in rule order, each at most once.
    ///
    /// Only rules whose `eventType` equals the event's `type` are evaluated. A
    /// rule counts when its expression yields exactly `true`.
    pub fn match_event(&self, event: &Value, rules: &[ProfileRule]) -> DetectResult<Vec<String>> {
        let event_type = event.get("type").and_then(Value::as_str);
        let mut matched: Vec<String> = Vec::new();
        for rule in rules {
            if event_type != Some(rule.event_type.as_str()) {
                continue;
            }
            let hit = self.evaluate_rule(rule, event)?;
            epd_trace!(rule, rule = %rule.name, matched = hit, "rule evaluated");
            if hit && !matched.contains(&rule.name) {
                matched.push(rule.name.clone());
            }
        }
        Ok(matched)
    }

    /// Evaluate one rule's expression against `event`.
    pub fn evaluate_rule(&self, rule: &ProfileRule, event: &Value) -> DetectResult<bool> {
        let tokens = split_expression(&rule.expression);
        let mut pieces = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                Token::Segment(segment) => {
                    let resolved = self.resolver.resolve(segment, event, self.executor)?;
                    epd_trace!(
                        rule,
                        rule = %rule.name,
                        segment = segment.trim(),
                        kind = ?resolved.kind,
                        "predicate resolved"
                    );
                    pieces.push(Piece::Value(resolved.value));
                }
                Token::Op(op) => pieces.push(Piece::Op(op)),
            }
        }
        let outcome = reduce(&pieces, self.executor)?;
        Ok(outcome == Some(Value::Bool(true)))
    }
}
