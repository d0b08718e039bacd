use std::sync::atomic::{AtomicUsize, Ordering};

use epd_core::{
    DetectReason, DetectionResult, DocumentClassifier, DocumentShape, ExpressionExecutor,
    PredicateResolver, ProfileDetector, ProfileRule, RuleSetValidator, Violation, detect_profiles,
};
use epd_lang::{LangError, LangResult};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn shipping_rule() -> Value {
    json!([{
        "name": "ShippingProfile",
        "eventType": "ObjectEvent",
        "expression": "bizStep === 'shipping'"
    }])
}

fn object_event(biz_step: &str, action: &str) -> Value {
    json!({
        "type": "ObjectEvent",
        "action": action,
        "bizStep": biz_step,
        "epcList": ["urn:epc:id:sgtin:0614141.107346.2017"]
    })
}

fn epcis_document(events: Vec<Value>) -> Value {
    json!({
        "@context": ["https://ref.gs1.org/standards/epcis/2.0.0/epcis-context.jsonld"],
        "type": "EPCISDocument",
        "schemaVersion": "2.0",
        "epcisBody": { "eventList": events }
    })
}

fn query_document(events: Vec<Value>) -> Value {
    json!({
        "type": "EPCISQueryDocument",
        "epcisBody": {
            "queryResults": {
                "queryName": "SimpleEventQuery",
                "resultsBody": { "eventList": events }
            }
        }
    })
}

fn reason(result: Result<DetectionResult, epd_core::DetectError>) -> DetectReason {
    result.unwrap_err().reason().clone()
}

// ---------------------------------------------------------------------------
// Bare events
// ---------------------------------------------------------------------------

#[test]
fn bare_event_match() {
    let out = detect_profiles(&object_event("shipping", "ADD"), &shipping_rule()).unwrap();
    assert_eq!(out, DetectionResult::Event(vec!["ShippingProfile".into()]));
}

#[test]
fn bare_event_no_match_is_empty() {
    let out = detect_profiles(&object_event("receiving", "ADD"), &shipping_rule()).unwrap();
    assert_eq!(out, DetectionResult::Event(vec![]));
}

#[test]
fn composite_expression() {
    let rules = json!([{
        "name": "ShipAdd",
        "eventType": "ObjectEvent",
        "expression": "bizStep === 'shipping' && action === 'ADD'"
    }]);
    let hit = detect_profiles(&object_event("shipping", "ADD"), &rules).unwrap();
    assert_eq!(hit.as_event(), Some(&["ShipAdd".to_string()][..]));
    let miss = detect_profiles(&object_event("shipping", "OBSERVE"), &rules).unwrap();
    assert_eq!(miss.as_event(), Some(&[][..]));
}

#[test]
fn helper_predicates() {
    let rules = json!([
        {
            "name": "Tagged",
            "eventType": "ObjectEvent",
            "expression": "_.includes(epcList, 'urn:epc:id:sgtin:0614141.107346.2017')"
        },
        {
            "name": "HasEpcs",
            "eventType": "ObjectEvent",
            "expression": "!_.isEmpty(epcList) && bizStep === 'shipping'"
        }
    ]);
    let out = detect_profiles(&object_event("shipping", "ADD"), &rules).unwrap();
    assert_eq!(
        out,
        DetectionResult::Event(vec!["Tagged".into(), "HasEpcs".into()])
    );
}

#[test]
fn duplicate_names_collapse() {
    let rules = json!([
        {"name": "P", "eventType": "ObjectEvent", "expression": "bizStep === 'shipping'"},
        {"name": "P", "eventType": "ObjectEvent", "expression": "action === 'ADD'"}
    ]);
    let out = detect_profiles(&object_event("shipping", "ADD"), &rules).unwrap();
    assert_eq!(out, DetectionResult::Event(vec!["P".into()]));
}

#[test]
fn precedence_is_and_over_or() {
    let rules = json!([{
        "name": "P",
        "eventType": "ObjectEvent",
        "expression": "bizStep === 'x' && action === 'y' || action === 'ADD'"
    }]);
    let out = detect_profiles(&object_event("shipping", "ADD"), &rules).unwrap();
    assert_eq!(out, DetectionResult::Event(vec!["P".into()]));
}

#[test]
fn truthy_result_is_not_a_match() {
    let rules = json!([{"name": "P", "eventType": "ObjectEvent", "expression": "bizStep"}]);
    let out = detect_profiles(&object_event("shipping", "ADD"), &rules).unwrap();
    assert_eq!(out, DetectionResult::Event(vec![]));
}

// ---------------------------------------------------------------------------
// Container documents
// ---------------------------------------------------------------------------

#[test]
fn epcis_document_results_align_with_events() {
    let doc = epcis_document(vec![
        object_event("shipping", "ADD"),
        object_event("receiving", "ADD"),
        json!({"type": "AggregationEvent", "bizStep": "shipping"}),
    ]);
    let out = detect_profiles(&doc, &shipping_rule()).unwrap();
    assert_eq!(
        out,
        DetectionResult::Events(vec![vec!["ShippingProfile".into()], vec![], vec![]])
    );
}

#[test]
fn order_follows_events_not_rules() {
    let rules = json!([
        {"name": "Receiving", "eventType": "ObjectEvent", "expression": "bizStep === 'receiving'"},
        {"name": "Shipping", "eventType": "ObjectEvent", "expression": "bizStep === 'shipping'"}
    ]);
    let doc = epcis_document(vec![
        object_event("shipping", "ADD"),
        object_event("receiving", "ADD"),
    ]);
    let out = detect_profiles(&doc, &rules).unwrap();
    assert_eq!(
        out,
        DetectionResult::Events(vec![vec!["Shipping".into()], vec!["Receiving".into()]])
    );
}

#[test]
fn query_document_nesting() {
    let doc = query_document(vec![
        object_event("shipping", "ADD"),
        object_event("shipping", "OBSERVE"),
    ]);
    let out = detect_profiles(&doc, &shipping_rule()).unwrap();
    assert_eq!(out.as_events().map(<[_]>::len), Some(2));
    assert_eq!(
        out,
        DetectionResult::Events(vec![
            vec!["ShippingProfile".into()],
            vec!["ShippingProfile".into()]
        ])
    );
}

#[test]
fn container_without_event_list_is_empty() {
    let doc = json!({"type": "EPCISDocument", "epcisBody": {}});
    let out = detect_profiles(&doc, &shipping_rule()).unwrap();
    assert_eq!(out, DetectionResult::Events(vec![]));
}

#[test]
fn results_serialise_as_plain_arrays() {
    let doc = epcis_document(vec![object_event("shipping", "ADD"), object_event("x", "ADD")]);
    let out = detect_profiles(&doc, &shipping_rule()).unwrap();
    assert_eq!(
        serde_json::to_value(&out).unwrap(),
        json!([["ShippingProfile"], []])
    );
}

#[test]
fn repeated_calls_are_identical() {
    let doc = epcis_document(vec![object_event("shipping", "ADD")]);
    let detector = ProfileDetector::new();
    let first = detector.detect(&doc, &shipping_rule()).unwrap();
    for _ in 0..5 {
        assert_eq!(detector.detect(&doc, &shipping_rule()).unwrap(), first);
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn empty_inputs() {
    assert_eq!(
        reason(detect_profiles(&json!({}), &shipping_rule())),
        DetectReason::EmptyInput
    );
    assert_eq!(
        reason(detect_profiles(&json!({"type": "ObjectEvent"}), &json!([]))),
        DetectReason::EmptyInput
    );
    assert_eq!(
        reason(detect_profiles(&Value::Null, &shipping_rule())),
        DetectReason::EmptyInput
    );
    assert_eq!(
        reason(ProfileDetector::new().detect_rules(&object_event("shipping", "ADD"), &[])),
        DetectReason::EmptyInput
    );
}

#[test]
fn empty_check_comes_before_schema() {
    // invalid rules, but the document is empty
    assert_eq!(
        reason(detect_profiles(&json!({}), &json!([{"name": 1}]))),
        DetectReason::EmptyInput
    );
}

#[test]
fn invalid_rule_set_reports_first_diagnostic() {
    let rules = json!([{"name": "P", "eventType": "ObjectEvent"}]);
    assert_eq!(
        reason(detect_profiles(&object_event("shipping", "ADD"), &rules)),
        DetectReason::InvalidRuleSet("must have required property 'expression'".into())
    );
    assert_eq!(
        reason(detect_profiles(&object_event("shipping", "ADD"), &json!({"rules": []}))),
        DetectReason::InvalidRuleSet("must be array".into())
    );
}

#[test]
fn schema_is_checked_before_shape() {
    let rules = json!([{"name": "P"}]);
    assert!(matches!(
        reason(detect_profiles(&json!({"foo": 1}), &rules)),
        DetectReason::InvalidRuleSet(_)
    ));
}

#[test]
fn unrecognized_shape() {
    assert_eq!(
        reason(detect_profiles(&json!({"foo": 1}), &shipping_rule())),
        DetectReason::UnrecognizedDocumentShape
    );
}

#[test]
fn evaluation_errors_propagate() {
    let rules = json!([{"name": "P", "eventType": "ObjectEvent", "expression": "_.frob(epcList)"}]);
    assert_eq!(
        reason(detect_profiles(&object_event("shipping", "ADD"), &rules)),
        DetectReason::Expression(LangError::UnknownHelper("frob".into()))
    );

    let rules = json!([{"name": "P", "eventType": "ObjectEvent", "expression": "bizStep === ("}]);
    assert!(matches!(
        reason(detect_profiles(&object_event("shipping", "ADD"), &rules)),
        DetectReason::Expression(LangError::Parse { .. })
    ));
}

#[test]
fn deeply_nested_expression_is_an_error() {
    let expression = format!(
        "{}bizStep === 'shipping'{}",
        "(".repeat(3000),
        ")".repeat(3000)
    );
    let rules = json!([{"name": "P", "eventType": "ObjectEvent", "expression": expression}]);
    assert!(matches!(
        reason(detect_profiles(&object_event("shipping", "ADD"), &rules)),
        DetectReason::Expression(LangError::Parse { .. })
    ));

    let expression = format!("{}bizStep", "!".repeat(200_000));
    let rules = json!([{"name": "P", "eventType": "ObjectEvent", "expression": expression}]);
    assert!(matches!(
        reason(detect_profiles(&object_event("shipping", "ADD"), &rules)),
        DetectReason::Expression(LangError::Parse { .. })
    ));
}

#[test]
fn rules_for_other_event_types_are_not_evaluated() {
    // would fail if evaluated
    let rules = json!([{"name": "P", "eventType": "TransactionEvent", "expression": "_.frob(x)"}]);
    let out = detect_profiles(&object_event("shipping", "ADD"), &rules).unwrap();
    assert_eq!(out, DetectionResult::Event(vec![]));
}

// ---------------------------------------------------------------------------
// Injected capabilities
// ---------------------------------------------------------------------------

struct AlwaysBare;

impl DocumentClassifier for AlwaysBare {
    fn classify(&self, _document: &Value) -> DocumentShape {
        DocumentShape::BareEvent
    }
}

struct RejectAll;

impl RuleSetValidator for RejectAll {
    fn validate(&self, _rules: &Value) -> Vec<Violation> {
        vec![Violation {
            instance_path: String::new(),
            message: "rejected".into(),
        }]
    }
}

#[derive(Default)]
struct CountingExecutor {
    calls: AtomicUsize,
}

impl ExpressionExecutor for CountingExecutor {
    fn execute(&self, _expression: &str, _event: &Value) -> LangResult<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Value::Bool(true)))
    }
}

#[test]
fn injected_classifier_is_honoured() {
    let detector = ProfileDetector::new().with_classifier(AlwaysBare);
    let doc = json!({"type": "SensorEvent", "bizStep": "shipping"});
    let rules = vec![ProfileRule::new("S", "SensorEvent", "bizStep === 'shipping'")];
    let out = detector.detect_rules(&doc, &rules).unwrap();
    assert_eq!(out, DetectionResult::Event(vec!["S".into()]));
}

#[test]
fn injected_validator_is_honoured() {
    let detector = ProfileDetector::new().with_validator(RejectAll);
    let err = detector
        .detect(&object_event("shipping", "ADD"), &shipping_rule())
        .unwrap_err();
    assert_eq!(err.reason(), &DetectReason::InvalidRuleSet("rejected".into()));
}

#[test]
fn injected_executor_is_honoured() {
    let detector = ProfileDetector::new().with_executor(CountingExecutor::default());
    let rules = json!([{
        "name": "P",
        "eventType": "ObjectEvent",
        "expression": "whatever && ignored || still ignored"
    }]);
    let out = detector.detect(&object_event("receiving", "ADD"), &rules).unwrap();
    assert_eq!(out, DetectionResult::Event(vec!["P".into()]));
}

#[test]
fn custom_helper_prefix_still_evaluates() {
    let detector = ProfileDetector::new().with_resolver(PredicateResolver::new(["_.", "lodash."]));
    assert_eq!(detector.resolver().helper_prefixes().len(), 2);
    let out = detector
        .detect(&object_event("shipping", "ADD"), &shipping_rule())
        .unwrap();
    assert_eq!(out, DetectionResult::Event(vec!["ShippingProfile".into()]));
}

#[test]
fn detector_is_shareable_across_threads() {
    let detector = std::sync::Arc::new(ProfileDetector::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let detector = detector.clone();
            std::thread::spawn(move || {
                detector
                    .detect(&object_event("shipping", "ADD"), &shipping_rule())
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(
            handle.join().unwrap(),
            DetectionResult::Event(vec!["ShippingProfile".into()])
        );
    }
}
