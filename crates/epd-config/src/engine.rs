use serde::Deserialize;

/// `[engine]` section: how predicates and documents are recognised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefixes that mark a helper-style predicate (`_.includes(..)`).
    pub helper_prefixes: Vec<String>,
    /// Event `type` values accepted as bare events.
    pub event_types: Vec<String>,
}

// Mirrors `epd_core::DEFAULT_HELPER_PREFIX` and `epd_core::DEFAULT_EVENT_TYPES`;
// the runtime tests assert the two stay equal.
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            helper_prefixes: vec!["_.".to_string()],
            event_types: [
                "ObjectEvent",
                "AggregationEvent",
                "TransactionEvent",
                "TransformationEvent",
                "AssociationEvent",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
