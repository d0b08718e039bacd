//! Structural validation of a raw rule set.

use std::fmt;

use serde_json::Value;

const REQUIRED: [&str; 3] = ["name", "eventType", "expression"];

/// One schema diagnostic: where it occurred and what is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the rule set, `""` for the root.
    pub instance_path: String,
    pub message: String,
}

impl Violation {
    fn new(instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance_path: instance_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a raw rule set before any rule is used. An empty result means
/// the rule set is valid; otherwise the first violation is reported.
pub trait RuleSetValidator: Send + Sync {
    fn validate(&self, rules: &Value) -> Vec<Violation>;
}

/// Rule set must be an array of objects, each with string `name`,
/// `eventType` and `expression`. Other properties are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleSetSchema;

impl RuleSetValidator for RuleSetSchema {
    fn validate(&self, rules: &Value) -> Vec<Violation> {
        let Some(items) = rules.as_array() else {
            return vec![Violation::new("", "must be array")];
        };
        let mut violations = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let path = format!("/{i}");
            let Some(obj) = item.as_object() else {
                violations.push(Violation::new(path, "must be object"));
                continue;
            };
            for key in REQUIRED {
                if !obj.contains_key(key) {
                    violations.push(Violation::new(
                        path.clone(),
                        format!("must have required property '{key}'"),
                    ));
                }
            }
            for key in REQUIRED {
                if obj.get(key).is_some_and(|v| !v.is_string()) {
                    violations.push(Violation::new(format!("{path}/{key}"), "must be string"));
                }
            }
        }
        violations
    }
}
