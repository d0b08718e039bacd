use serde_json::{Value, json};

use epd_lang::{LangError, LangResult};

use super::*;
use crate::error::DetectReason;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rule(name: &str, event_type: &str, expression: &str) -> ProfileRule {
    ProfileRule::new(name, event_type, expression)
}

fn shipping(action: &str) -> Value {
    json!({
        "type": "ObjectEvent",
        "action": action,
        "bizStep": "shipping",
        "epcList": ["urn:epc:id:sgtin:0614141.107346.2017"],
        "ilmd": {}
    })
}

fn rule_matches(expression: &str, event: &Value) -> bool {
    let resolver = PredicateResolver::default();
    let matcher = RuleMatcher::new(&LangExecutor, &resolver);
    matcher
        .evaluate_rule(&rule("P", "ObjectEvent", expression), event)
        .unwrap()
}

/// Executor that answers every segment with the same fixed value.
struct Scripted {
    answer: Option<Value>,
}

impl ExpressionExecutor for Scripted {
    fn execute(&self, _expression: &str, _event: &Value) -> LangResult<Option<Value>> {
        Ok(self.answer.clone())
    }
}

// ---------------------------------------------------------------------------
// Segmenter
// ---------------------------------------------------------------------------

#[test]
fn split_single_segment() {
    assert_eq!(
        split_expression("bizStep === 'shipping'"),
        vec![Token::Segment("bizStep === 'shipping'")]
    );
}

#[test]
fn split_interleaves_operators() {
    assert_eq!(
        split_expression("a === 1 && b || !c"),
        vec![
            Token::Segment("a === 1 "),
            Token::Op(BoolOp::And),
            Token::Segment(" b "),
            Token::Op(BoolOp::Or),
            Token::Segment(" !c"),
        ]
    );
}

#[test]
fn split_is_not_quote_aware() {
    let tokens = split_expression("note === 'a && b'");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1], Token::Op(BoolOp::And));
}

#[test]
fn split_keeps_empty_segments() {
    assert_eq!(
        split_expression("&&"),
        vec![Token::Segment(""), Token::Op(BoolOp::And), Token::Segment("")]
    );
    assert_eq!(split_expression(""), vec![Token::Segment("")]);
}

#[test]
fn split_single_ampersand_is_not_an_operator() {
    assert_eq!(split_expression("a & b"), vec![Token::Segment("a & b")]);
}

// ---------------------------------------------------------------------------
// Predicate resolver
// ---------------------------------------------------------------------------

#[test]
fn classify_helper_segments() {
    let resolver = PredicateResolver::default();
    assert_eq!(resolver.classify("_.includes(epcList, 'x')"), PredicateKind::Helper);
    assert_eq!(resolver.classify("  !_.isEmpty(ilmd) "), PredicateKind::Helper);
    assert_eq!(resolver.classify(" bizStep === 'x'"), PredicateKind::Direct);
    assert_eq!(resolver.classify("! _.isEmpty(ilmd)"), PredicateKind::Direct);
    assert_eq!(resolver.classify("__.isEmpty(ilmd)"), PredicateKind::Direct);
}

#[test]
fn classify_with_custom_prefixes() {
    let resolver = PredicateResolver::new(["lodash.", "_."]);
    assert_eq!(resolver.classify("lodash.has(event, 'x')"), PredicateKind::Helper);
    assert_eq!(resolver.classify("_.has(event, 'x')"), PredicateKind::Helper);
    assert_eq!(resolver.helper_prefixes().len(), 2);
}

#[test]
fn resolve_evaluates_segment_verbatim() {
    let resolver = PredicateResolver::default();
    let resolved = resolver
        .resolve(" !_.isEmpty(epcList) ", &shipping("ADD"), &LangExecutor)
        .unwrap();
    assert_eq!(resolved.kind, PredicateKind::Helper);
    assert_eq!(resolved.value, Some(json!(true)));
}

#[test]
fn resolve_propagates_language_errors() {
    let resolver = PredicateResolver::default();
    let err = resolver
        .resolve("_.nope(epcList)", &shipping("ADD"), &LangExecutor)
        .unwrap_err();
    assert_eq!(
        err.reason(),
        &DetectReason::Expression(LangError::UnknownHelper("nope".into()))
    );
}

// ---------------------------------------------------------------------------
// Recomposer
// ---------------------------------------------------------------------------

#[test]
fn recompose_renders_literals_and_operators() {
    let pieces = vec![
        Piece::Value(Some(json!(true))),
        Piece::Op(BoolOp::And),
        Piece::Value(None),
        Piece::Op(BoolOp::Or),
        Piece::Value(Some(json!("it's"))),
    ];
    assert_eq!(recompose(&pieces), r"true && undefined || 'it\'s'");
}

#[test]
fn reduce_single_piece_is_the_value() {
    let pieces = vec![Piece::Value(Some(json!("shipping")))];
    assert_eq!(reduce(&pieces, &LangExecutor).unwrap(), Some(json!("shipping")));
}

#[test]
fn reduce_follows_evaluator_precedence() {
    let pieces = vec![
        Piece::Value(Some(json!(false))),
        Piece::Op(BoolOp::And),
        Piece::Value(Some(json!(false))),
        Piece::Op(BoolOp::Or),
        Piece::Value(Some(json!(true))),
    ];
    assert_eq!(reduce(&pieces, &LangExecutor).unwrap(), Some(json!(true)));
}

#[test]
fn reduce_returns_operand_values() {
    let pieces = vec![
        Piece::Value(Some(json!({"a": [1, 2]}))),
        Piece::Op(BoolOp::And),
        Piece::Value(Some(json!([1, "x"]))),
    ];
    assert_eq!(reduce(&pieces, &LangExecutor).unwrap(), Some(json!([1, "x"])));
}

// ---------------------------------------------------------------------------
// Rule matcher
// ---------------------------------------------------------------------------

#[test]
fn direct_predicate_matches() {
    assert!(rule_matches("bizStep === 'shipping'", &shipping("ADD")));
    assert!(!rule_matches("bizStep === 'receiving'", &shipping("ADD")));
}

#[test]
fn composite_predicate() {
    let expr = "bizStep === 'shipping' && action === 'ADD'";
    assert!(rule_matches(expr, &shipping("ADD")));
    assert!(!rule_matches(expr, &shipping("OBSERVE")));
}

#[test]
fn mixed_dialects() {
    let expr = "_.includes(epcList, 'urn:epc:id:sgtin:0614141.107346.2017') && action === 'ADD' && _.isEmpty(ilmd)";
    assert!(rule_matches(expr, &shipping("ADD")));
    assert!(!rule_matches("!_.isEmpty(ilmd) || action === 'DELETE'", &shipping("ADD")));
}

#[test]
fn truthy_non_boolean_does_not_match() {
    assert!(!rule_matches("bizStep", &shipping("ADD")));
    assert!(!rule_matches("action && bizStep", &shipping("ADD")));
    assert!(!rule_matches("1", &shipping("ADD")));
}

#[test]
fn whitespace_segment_is_parse_error() {
    let resolver = PredicateResolver::default();
    let matcher = RuleMatcher::new(&LangExecutor, &resolver);
    let err = matcher
        .evaluate_rule(&rule("P", "ObjectEvent", "bizStep === 'shipping' &&  "), &shipping("ADD"))
        .unwrap_err();
    assert!(matches!(
        err.reason(),
        DetectReason::Expression(LangError::Parse { .. })
    ));
}

#[test]
fn match_event_filters_by_type_and_dedups() {
    let rules = vec![
        rule("Shipping", "ObjectEvent", "bizStep === 'shipping'"),
        rule("Aggregated", "AggregationEvent", "bizStep === 'shipping'"),
        rule("Adding", "ObjectEvent", "action === 'ADD'"),
        rule("Shipping", "ObjectEvent", "_.size(epcList) === 1"),
        rule("Never", "ObjectEvent", "false"),
    ];
    let resolver = PredicateResolver::default();
    let matcher = RuleMatcher::new(&LangExecutor, &resolver);
    let names = matcher.match_event(&shipping("ADD"), &rules).unwrap();
    assert_eq!(names, vec!["Shipping", "Adding"]);
}

#[test]
fn match_event_without_type_matches_nothing() {
    let rules = vec![rule("Any", "ObjectEvent", "true")];
    let resolver = PredicateResolver::default();
    let matcher = RuleMatcher::new(&LangExecutor, &resolver);
    assert!(matcher.match_event(&json!({"bizStep": "x"}), &rules).unwrap().is_empty());
    assert!(matcher.match_event(&json!({"type": 7}), &rules).unwrap().is_empty());
}

#[test]
fn match_event_stops_at_first_error() {
    let rules = vec![
        rule("Ok", "ObjectEvent", "true"),
        rule("Broken", "ObjectEvent", "bizStep ==="),
    ];
    let resolver = PredicateResolver::default();
    let matcher = RuleMatcher::new(&LangExecutor, &resolver);
    assert!(matcher.match_event(&shipping("ADD"), &rules).is_err());
}

#[test]
fn injected_executor_is_used_for_every_segment() {
    let resolver = PredicateResolver::default();
    let exec = Scripted {
        answer: Some(json!(true)),
    };
    let matcher = RuleMatcher::new(&exec, &resolver);
    let r = rule("P", "ObjectEvent", "anything at all || more of it");
    assert!(matcher.evaluate_rule(&r, &shipping("ADD")).unwrap());

    let exec = Scripted {
        answer: Some(json!("yes")),
    };
    let matcher = RuleMatcher::new(&exec, &resolver);
    assert!(!matcher.evaluate_rule(&r, &shipping("ADD")).unwrap());
}
