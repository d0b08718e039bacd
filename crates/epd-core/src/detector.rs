use orion_error::StructError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{DocumentClassifier, StructuralClassifier, match_document};
use crate::error::{DetectReason, DetectResult};
use crate::rule::{ExpressionExecutor, LangExecutor, PredicateResolver, ProfileRule, RuleMatcher};
use crate::schema::{RuleSetSchema, RuleSetValidator};

// ---------------------------------------------------------------------------
// DetectionResult
// ---------------------------------------------------------------------------

/// Matched profile names for a bare event, or one list per event of a
/// container document (empty lists included, in source order).
///
/// Serialises as a plain array. Not deserialisable: a container with no
/// events and a bare event with no matches both render as `[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DetectionResult {
    Event(Vec<String>),
    Events(Vec<Vec<String>>),
}

impl DetectionResult {
    /// Profiles of a bare event; `None` for a container document.
    pub fn as_event(&self) -> Option<&[String]> {
        match self {
            DetectionResult::Event(names) => Some(names),
            DetectionResult::Events(_) => None,
        }
    }

    /// Per-event profiles of a container document; `None` for a bare event.
    pub fn as_events(&self) -> Option<&[Vec<String>]> {
        match self {
            DetectionResult::Event(_) => None,
            DetectionResult::Events(lists) => Some(lists),
        }
    }
}

// ---------------------------------------------------------------------------
// ProfileDetector
// ---------------------------------------------------------------------------

/// Entry point of the engine. Holds the injected capabilities; stateless
/// across calls and shareable between threads.
pub struct ProfileDetector {
    classifier: Box<dyn DocumentClassifier>,
    validator: Box<dyn RuleSetValidator>,
    executor: Box<dyn ExpressionExecutor>,
    resolver: PredicateResolver,
}

impl Default for ProfileDetector {
    fn default() -> Self {
        Self {
            classifier: Box::new(StructuralClassifier::default()),
            validator: Box::new(RuleSetSchema),
            executor: Box::new(LangExecutor),
            resolver: PredicateResolver::default(),
        }
    }
}

impl ProfileDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(mut self, classifier: impl DocumentClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn with_validator(mut self, validator: impl RuleSetValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_executor(mut self, executor: impl ExpressionExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn with_resolver(mut self, resolver: PredicateResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn resolver(&self) -> &PredicateResolver {
        &self.resolver
    }

    /// Detect profiles for a raw JSON rule set.
    ///
    /// Checks, in order: both inputs present, rule set valid against the
    /// schema, document shape recognised.
    pub fn detect(&self, document: &Value, rules: &Value) -> DetectResult<DetectionResult> {
        if is_empty_document(document) || is_empty_rule_set(rules) {
            return Err(StructError::from(DetectReason::EmptyInput));
        }
        if let Some(first) = self.validator.validate(rules).into_iter().next() {
            return Err(StructError::from(DetectReason::InvalidRuleSet(first.message))
                .with_detail(format!("at '{}'", first.instance_path)));
        }
        let rules = Vec::<ProfileRule>::deserialize(rules).map_err(|e| {
            StructError::from(DetectReason::InvalidRuleSet(e.to_string()))
        })?;
        self.run(document, &rules)
    }

    /// Detect profiles for rules that are already typed.
    pub fn detect_rules(
        &self,
        document: &Value,
        rules: &[ProfileRule],
    ) -> DetectResult<DetectionResult> {
        if is_empty_document(document) || rules.is_empty() {
            return Err(StructError::from(DetectReason::EmptyInput));
        }
        self.run(document, rules)
    }

    fn run(&self, document: &Value, rules: &[ProfileRule]) -> DetectResult<DetectionResult> {
        let shape = self.classifier.classify(document);
        let matcher = RuleMatcher::new(self.executor.as_ref(), &self.resolver);
        match_document(document, shape, &matcher, rules)
    }
}

/// Detect profiles with the default capabilities.
pub fn detect_profiles(document: &Value, rules: &Value) -> DetectResult<DetectionResult> {
    ProfileDetector::default().detect(document, rules)
}

/// A document with nothing in it: `null`, scalars, and empty containers.
fn is_empty_document(document: &Value) -> bool {
    match document {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Falsy rule sets and empty arrays count as missing; anything else goes on
/// to schema validation.
fn is_empty_rule_set(rules: &Value) -> bool {
    !epd_lang::is_truthy(Some(rules)) || rules.as_array().is_some_and(Vec::is_empty)
}
