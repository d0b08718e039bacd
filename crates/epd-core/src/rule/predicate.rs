use serde_json::Value;

use super::executor::ExpressionExecutor;
use crate::error::{DetectResult, expression_error};

/// Prefix that marks a helper-style predicate when none is configured.
pub const DEFAULT_HELPER_PREFIX: &str = "_.";

/// How a segment is written. Both kinds go through the same executor call;
/// the tag only records which dialect the rule author used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// `_.includes(epcList, 'x')`, `!_.isEmpty(ilmd)`
    Helper,
    /// Any other segment, e.g. `bizStep === 'shipping'`.
    Direct,
}

/// Result of resolving one segment against an event.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPredicate {
    pub kind: PredicateKind,
    pub value: Option<Value>,
}

/// Classifies and resolves atomic segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateResolver {
    helper_prefixes: Vec<String>,
}

impl Default for PredicateResolver {
    fn default() -> Self {
        Self {
            helper_prefixes: vec![DEFAULT_HELPER_PREFIX.to_string()],
        }
    }
}

impl PredicateResolver {
    pub fn new<I, S>(helper_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            helper_prefixes: helper_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn helper_prefixes(&self) -> &[String] {
        &self.helper_prefixes
    }

    /// A segment is helper-style when, after leading whitespace and at most one
    /// `!`, it starts with a configured prefix.
    pub fn classify(&self, segment: &str) -> PredicateKind {
        let body = segment.trim_start();
        let body = body.strip_prefix('!').unwrap_or(body);
        if self
            .helper_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && body.starts_with(prefix.as_str()))
        {
            PredicateKind::Helper
        } else {
            PredicateKind::Direct
        }
    }

    /// Classify `segment` and evaluate it verbatim against `event`.
    pub fn resolve(
        &self,
        segment: &str,
        event: &Value,
        executor: &dyn ExpressionExecutor,
    ) -> DetectResult<ResolvedPredicate> {
        let kind = self.classify(segment);
        let value = executor.execute(segment, event).map_err(expression_error)?;
        Ok(ResolvedPredicate { kind, value })
    }
}
