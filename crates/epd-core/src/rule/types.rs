use serde::{Deserialize, Serialize};

/// One profile detection rule: when an event of `event_type` satisfies
/// `expression`, the event carries profile `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRule {
    pub name: String,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub expression: String,
}

impl ProfileRule {
    pub fn new(
        name: impl Into<String>,
        event_type: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            event_type: event_type.into(),
            expression: expression.into(),
        }
    }
}
