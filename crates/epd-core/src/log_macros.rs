/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so call sites only name the domain:
/// `rule` (per-rule evaluation), `doc` (document shape and walking).
///
/// ```ignore
/// epd_debug!(doc, shape = shape.as_str(), events = 3, "document classified");
/// epd_trace!(rule, rule = %rule.name, matched = true, "rule evaluated");
/// ```

/// Internal helper. Use `epd_debug!` / `epd_trace!`.
#[doc(hidden)]
macro_rules! epd_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

/// Log at DEBUG level with an automatic `domain` field.
macro_rules! epd_debug {
    ($domain:ident, $($rest:tt)*) => {
        epd_log!(debug, $domain, $($rest)*)
    };
}

/// Log at TRACE level with an automatic `domain` field.
macro_rules! epd_trace {
    ($domain:ident, $($rest:tt)*) => {
        epd_log!(trace, $domain, $($rest)*)
    };
}
