//! Document shapes and the walk from a document to its events.

use orion_error::StructError;
use serde_json::Value;

use crate::detector::DetectionResult;
use crate::error::{DetectReason, DetectResult};
use crate::rule::{ProfileRule, RuleMatcher};

/// EPCIS 2.0 event types recognised as bare events when none are configured.
pub const DEFAULT_EVENT_TYPES: [&str; 5] = [
    "ObjectEvent",
    "AggregationEvent",
    "TransactionEvent",
    "TransformationEvent",
    "AssociationEvent",
];

const EVENT_LIST: &str = "/epcisBody/eventList";
const QUERY_EVENT_LIST: &str = "/epcisBody/queryResults/resultsBody/eventList";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    BareEvent,
    EpcisDocument,
    EpcisQueryDocument,
    Unidentified,
}

impl DocumentShape {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentShape::BareEvent => "bare-event",
            DocumentShape::EpcisDocument => "epcis-document",
            DocumentShape::EpcisQueryDocument => "epcis-query-document",
            DocumentShape::Unidentified => "unidentified",
        }
    }
}

/// Decides which shape a document has.
pub trait DocumentClassifier: Send + Sync {
    fn classify(&self, document: &Value) -> DocumentShape;
}

/// Classifies by structure only; the document's own `type` tag is consulted
/// solely to recognise a bare event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralClassifier {
    event_types: Vec<String>,
}

impl Default for StructuralClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_TYPES)
    }
}

impl StructuralClassifier {
    pub fn new<I, S>(event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            event_types: event_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn event_types(&self) -> &[String] {
        &self.event_types
    }
}

impl DocumentClassifier for StructuralClassifier {
    fn classify(&self, document: &Value) -> DocumentShape {
        let Some(doc) = document.as_object() else {
            return DocumentShape::Unidentified;
        };
        if let Some(body) = doc.get("epcisBody").and_then(Value::as_object) {
            return if body.get("queryResults").is_some_and(Value::is_object) {
                DocumentShape::EpcisQueryDocument
            } else {
                DocumentShape::EpcisDocument
            };
        }
        match doc.get("type").and_then(Value::as_str) {
            Some(t) if self.event_types.iter().any(|known| known == t) => DocumentShape::BareEvent,
            _ => DocumentShape::Unidentified,
        }
    }
}

/// Events carried by a container document. A missing or non-array event list
/// yields no events.
pub fn event_list(document: &Value, shape: DocumentShape) -> &[Value] {
    let pointer = match shape {
        DocumentShape::EpcisDocument => EVENT_LIST,
        DocumentShape::EpcisQueryDocument => QUERY_EVENT_LIST,
        DocumentShape::BareEvent | DocumentShape::Unidentified => return &[],
    };
    document
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Walk `document` according to `shape` and match every event it carries.
pub fn match_document(
    document: &Value,
    shape: DocumentShape,
    matcher: &RuleMatcher<'_>,
    rules: &[ProfileRule],
) -> DetectResult<DetectionResult> {
    match shape {
        DocumentShape::BareEvent => {
            epd_debug!(doc, shape = shape.as_str(), rules = rules.len(), "matching bare event");
            Ok(DetectionResult::Event(matcher.match_event(document, rules)?))
        }
        DocumentShape::EpcisDocument | DocumentShape::EpcisQueryDocument => {
            let events = event_list(document, shape);
            epd_debug!(
                doc,
                shape = shape.as_str(),
                events = events.len(),
                rules = rules.len(),
                "matching document events"
            );
            let per_event = events
                .iter()
                .map(|event| matcher.match_event(event, rules))
                .collect::<DetectResult<Vec<_>>>()?;
            Ok(DetectionResult::Events(per_event))
        }
        DocumentShape::Unidentified => {
            Err(StructError::from(DetectReason::UnrecognizedDocumentShape))
        }
    }
}
