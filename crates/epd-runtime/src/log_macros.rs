/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so callers only name the domain:
/// `sys` (process lifecycle) or `conf` (configuration).
///
/// ```ignore
/// epd_info!(sys, event_types = 5, "detector ready");
/// epd_debug!(conf, path = %path.display(), "loading config");
/// ```

/// Internal helper. Use `epd_info!` / `epd_debug!`.
#[doc(hidden)]
macro_rules! epd_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

/// Log at INFO level with an automatic `domain` field.
macro_rules! epd_info {
    ($domain:ident, $($rest:tt)*) => {
        epd_log!(info, $domain, $($rest)*)
    };
}

/// Log at DEBUG level with an automatic `domain` field.
macro_rules! epd_debug {
    ($domain:ident, $($rest:tt)*) => {
        epd_log!(debug, $domain, $($rest)*)
    };
}
