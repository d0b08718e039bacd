use serde_json::Value;

use super::unknown_method;
use crate::error::LangResult;
use crate::value::{strict_equals, to_display_string};

/// `receiver.method(args)` for the string and array methods rules rely on.
///
/// A `null`/`undefined` receiver yields `undefined` instead of failing, the
/// same as member access.
pub(super) fn call_method(
    receiver: Option<&Value>,
    method: &str,
    args: &[Option<Value>],
) -> LangResult<Option<Value>> {
    let first = args.first().and_then(Option::as_ref);
    match receiver {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let needle = to_display_string(first);
            let out = match method {
                "includes" => Value::Bool(s.contains(&needle)),
                "startsWith" => Value::Bool(s.starts_with(&needle)),
                "endsWith" => Value::Bool(s.ends_with(&needle)),
                "indexOf" => match s.find(&needle) {
                    Some(byte_pos) => Value::from(s[..byte_pos].chars().count() as i64),
                    None => Value::from(-1),
                },
                "toLowerCase" => Value::String(s.to_lowercase()),
                "toUpperCase" => Value::String(s.to_uppercase()),
                "trim" => Value::String(s.trim().to_string()),
                other => return Err(unknown_method(other, "string")),
            };
            Ok(Some(out))
        }
        Some(Value::Array(items)) => {
            let out = match method {
                "includes" => Value::Bool(items.iter().any(|v| strict_equals(Some(v), first))),
                "indexOf" => match items.iter().position(|v| strict_equals(Some(v), first)) {
                    Some(i) => Value::from(i as i64),
                    None => Value::from(-1),
                },
                "join" => {
                    let sep = first.map_or(",".to_string(), |v| to_display_string(Some(v)));
                    let parts: Vec<String> = items
                        .iter()
                        .map(|v| match v {
                            Value::Null => String::new(),
                            other => to_display_string(Some(other)),
                        })
                        .collect();
                    Value::String(parts.join(&sep))
                }
                other => return Err(unknown_method(other, "array")),
            };
            Ok(Some(out))
        }
        Some(Value::Number(_)) => Err(unknown_method(method, "number")),
        Some(Value::Bool(_)) => Err(unknown_method(method, "boolean")),
        Some(Value::Object(_)) => Err(unknown_method(method, "object")),
    }
}
