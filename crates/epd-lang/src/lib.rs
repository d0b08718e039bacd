//! Predicate language used by profile rules.
//!
//! A small JavaScript-flavoured expression language evaluated against a single
//! JSON event. Identifiers resolve to top-level event fields, `_.name(..)`
//! invokes a helper, and `&&` / `||` follow JavaScript operand semantics.
//!
//! ```
//! use serde_json::json;
//!
//! let event = json!({ "type": "ObjectEvent", "bizStep": "shipping" });
//! let out = epd_lang::evaluate("bizStep === 'shipping'", &event).unwrap();
//! assert_eq!(out, Some(json!(true)));
//! ```

pub mod ast;
mod error;
mod eval;
mod parse_utils;
mod parser;
mod value;

pub use error::{LangError, LangResult};
pub use eval::{evaluate, evaluate_standalone};
pub use parser::{MAX_NESTING, parse_expression};
pub use value::{is_truthy, render_literal};

/// Identifier that qualifies helper calls (`_.includes(..)`).
pub const HELPER_QUALIFIER: &str = "_";
