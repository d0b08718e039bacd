//! Profile detection for EPCIS event documents.
//!
//! A document (bare event, EPCIS document or EPCIS query document) is matched
//! against a set of profile rules; every event yields the names of the rules
//! it satisfies.

#[macro_use]
mod log_macros;

pub mod detector;
pub mod document;
pub mod error;
pub mod rule;
pub mod schema;


pub use detector::{DetectionResult, ProfileDetector, detect_profiles};
pub use document::{DEFAULT_EVENT_TYPES, DocumentClassifier, DocumentShape, StructuralClassifier};
pub use error::{DetectError, DetectReason, DetectResult};
pub use rule::{ExpressionExecutor, LangExecutor, PredicateKind, PredicateResolver, ProfileRule};
pub use schema::{RuleSetSchema, RuleSetValidator, Violation};
