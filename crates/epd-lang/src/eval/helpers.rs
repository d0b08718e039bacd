//! `_.name(..)` helpers, modelled on the lodash functions rule authors use.

use serde_json::{Map, Value};

use super::member;
use crate::error::{LangError, LangResult};
use crate::value::{is_truthy, strict_equals, to_display_string};

/// Dispatch a helper call on already-evaluated arguments.
pub(super) fn call_helper(name: &str, args: &[Option<Value>]) -> LangResult<Option<Value>> {
    let out = match name {
        "get" => {
            arity(name, args, 2, 3)?;
            let found = path_get(arg(args, 0), &path_keys(arg(args, 1)));
            found.or_else(|| args.get(2).cloned().flatten())
        }
        "has" => {
            arity(name, args, 2, 2)?;
            let keys = path_keys(arg(args, 1));
            bool_value(!keys.is_empty() && path_get(arg(args, 0), &keys).is_some())
        }
        "includes" => {
            arity(name, args, 2, 2)?;
            bool_value(includes(arg(args, 0), arg(args, 1)))
        }
        "isEmpty" => {
            arity(name, args, 1, 1)?;
            bool_value(is_empty(arg(args, 0)))
        }
        "isNil" => {
            arity(name, args, 1, 1)?;
            bool_value(matches!(arg(args, 0), None | Some(Value::Null)))
        }
        "isNull" => {
            arity(name, args, 1, 1)?;
            bool_value(matches!(arg(args, 0), Some(Value::Null)))
        }
        "isUndefined" => {
            arity(name, args, 1, 1)?;
            bool_value(arg(args, 0).is_none())
        }
        "isString" => {
            arity(name, args, 1, 1)?;
            bool_value(matches!(arg(args, 0), Some(Value::String(_))))
        }
        "isNumber" => {
            arity(name, args, 1, 1)?;
            bool_value(matches!(arg(args, 0), Some(Value::Number(_))))
        }
        "isArray" => {
            arity(name, args, 1, 1)?;
            bool_value(matches!(arg(args, 0), Some(Value::Array(_))))
        }
        "isObject" => {
            arity(name, args, 1, 1)?;
            bool_value(matches!(
                arg(args, 0),
                Some(Value::Array(_)) | Some(Value::Object(_))
            ))
        }
        "isEqual" => {
            arity(name, args, 2, 2)?;
            bool_value(strict_equals(arg(args, 0), arg(args, 1)))
        }
        "size" => {
            arity(name, args, 1, 1)?;
            Some(Value::from(size(arg(args, 0))))
        }
        "some" => {
            arity(name, args, 1, 2)?;
            let iteratee = Iteratee::from_arg(arg(args, 1));
            bool_value(collection(arg(args, 0)).iter().any(|v| iteratee.test(v)))
        }
        "every" => {
            arity(name, args, 1, 2)?;
            let iteratee = Iteratee::from_arg(arg(args, 1));
            bool_value(collection(arg(args, 0)).iter().all(|v| iteratee.test(v)))
        }
        "startsWith" => {
            arity(name, args, 2, 2)?;
            bool_value(plain_string(arg(args, 0)).starts_with(&plain_string(arg(args, 1))))
        }
        "endsWith" => {
            arity(name, args, 2, 2)?;
            bool_value(plain_string(arg(args, 0)).ends_with(&plain_string(arg(args, 1))))
        }
        "toLower" => {
            arity(name, args, 1, 1)?;
            Some(Value::String(plain_string(arg(args, 0)).to_lowercase()))
        }
        "toUpper" => {
            arity(name, args, 1, 1)?;
            Some(Value::String(plain_string(arg(args, 0)).to_uppercase()))
        }
        other => return Err(LangError::UnknownHelper(other.to_string())),
    };
    Ok(out)
}

fn arity(name: &str, args: &[Option<Value>], min: usize, max: usize) -> LangResult<()> {
    if args.len() >= min && args.len() <= max {
        return Ok(());
    }
    let expected = match (min, max) {
        (1, 1) => "1",
        (2, 2) => "2",
        (1, 2) => "1 or 2",
        (2, 3) => "2 or 3",
        _ => "a different number of",
    };
    Err(LangError::Arity {
        helper: name.to_string(),
        expected,
        found: args.len(),
    })
}

fn arg(args: &[Option<Value>], i: usize) -> Option<&Value> {
    args.get(i).and_then(Option::as_ref)
}

fn bool_value(b: bool) -> Option<Value> {
    Some(Value::Bool(b))
}

/// lodash `toString`: `null`/`undefined` become the empty string.
fn plain_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        other => to_display_string(other),
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Split a property path (`a.b[0]['c']`, or an array of keys) into keys.
fn path_keys(path: Option<&Value>) -> Vec<String> {
    match path {
        None | Some(Value::Null) => vec![],
        Some(Value::Array(parts)) => parts.iter().map(|p| to_display_string(Some(p))).collect(),
        Some(Value::String(s)) => split_path(s),
        other => vec![to_display_string(other)],
    }
}

fn split_path(path: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    keys.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    keys.push(std::mem::take(&mut current));
                }
                let mut inner = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    inner.push(c);
                }
                keys.push(inner.trim().trim_matches(['\'', '"']).to_string());
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        keys.push(current);
    }
    keys
}

fn path_get(target: Option<&Value>, keys: &[String]) -> Option<Value> {
    let (first, rest) = keys.split_first()?;
    let mut current = member(target, first)?;
    for key in rest {
        current = member(Some(&current), key)?;
    }
    Some(current)
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

fn collection(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => map.values().cloned().collect(),
        _ => vec![],
    }
}

fn includes(haystack: Option<&Value>, needle: Option<&Value>) -> bool {
    match haystack {
        Some(Value::Array(items)) => items.iter().any(|v| strict_equals(Some(v), needle)),
        Some(Value::Object(map)) => map.values().any(|v| strict_equals(Some(v), needle)),
        Some(Value::String(s)) => s.contains(&to_display_string(needle)),
        _ => false,
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        _ => true,
    }
}

fn size(value: Option<&Value>) -> usize {
    match value {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Iteratee shorthands for `some` / `every`
// ---------------------------------------------------------------------------

enum Iteratee {
    /// No predicate: the element's own truthiness.
    Identity,
    /// `{ key: value }`: partial deep match.
    Matches(Map<String, Value>),
    /// `'path'`: truthiness of the property.
    Property(Vec<String>),
    /// `['path', value]`: property equals value.
    MatchesProperty(Vec<String>, Value),
}

impl Iteratee {
    fn from_arg(arg: Option<&Value>) -> Self {
        match arg {
            Some(Value::Object(map)) => Iteratee::Matches(map.clone()),
            Some(Value::String(_)) | Some(Value::Number(_)) => Iteratee::Property(path_keys(arg)),
            Some(Value::Array(pair)) if pair.len() == 2 => {
                Iteratee::MatchesProperty(path_keys(pair.first()), pair[1].clone())
            }
            _ => Iteratee::Identity,
        }
    }

    fn test(&self, item: &Value) -> bool {
        match self {
            Iteratee::Identity => is_truthy(Some(item)),
            Iteratee::Matches(source) => is_match_object(item, source),
            Iteratee::Property(keys) => is_truthy(path_get(Some(item), keys).as_ref()),
            Iteratee::MatchesProperty(keys, expected) => path_get(Some(item), keys)
                .is_some_and(|v| is_match(&v, expected)),
        }
    }
}

fn is_match_object(target: &Value, source: &Map<String, Value>) -> bool {
    let Value::Object(map) = target else {
        return source.is_empty();
    };
    source
        .iter()
        .all(|(k, expected)| map.get(k).is_some_and(|v| is_match(v, expected)))
}

fn is_match(target: &Value, source: &Value) -> bool {
    match source {
        Value::Object(src) => is_match_object(target, src),
        Value::Array(src) => match target {
            Value::Array(items) => src
                .iter()
                .all(|expected| items.iter().any(|v| is_match(v, expected))),
            _ => false,
        },
        _ => strict_equals(Some(target), Some(source)),
    }
}
