//! Subscriber setup driven by `[logging]`.

use std::fmt::{self as stdfmt, Write as _};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Result;
use epd_config::{LogFormat, LoggingConfig};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type Stack = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Stack> + Send + Sync>;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Install the global `tracing` subscriber described by `config`.
///
/// Events go to stderr and, when `config.file` is set, to that file as well.
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. `RUST_LOG` replaces the configured directives.
pub fn init_tracing(config: &LoggingConfig, base_dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    let mut layers: Vec<BoxedLayer> = vec![stderr_layer(config.format)];
    let mut guard = None;
    if let Some(ref file) = config.file {
        let (writer, file_guard) = open_log_file(&resolve_log_path(file, base_dir))?;
        layers.push(file_layer(config.format, writer));
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(guard)
}

/// `RUST_LOG` when set, otherwise the level and module overrides from config.
pub(crate) fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var("RUST_LOG").is_ok() {
        return Ok(EnvFilter::from_default_env());
    }
    let directives = config.directives();
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))
}

/// Relative log paths are taken relative to the config file's directory.
pub(crate) fn resolve_log_path(file: &Path, base_dir: &Path) -> PathBuf {
    if file.is_relative() {
        base_dir.join(file)
    } else {
        file.to_path_buf()
    }
}

fn open_log_file(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("log file path has no parent directory"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?;
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

fn stderr_layer(format: LogFormat) -> BoxedLayer {
    let ansi = std::io::stderr().is_terminal();
    match format {
        // JSON keeps `domain` as an ordinary field so consumers can query it
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Plain => fmt::layer()
            .event_format(DomainFormat::default())
            .with_ansi(ansi)
            .with_writer(std::io::stderr)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Plain => fmt::layer()
            .event_format(DomainFormat::default())
            .fmt_fields(FileFields::default())
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
    }
}

/// Separate field formatter type for the file layer, so span fields cached
/// by the (possibly coloured) stderr layer are not reused in the file.
#[derive(Default)]
struct FileFields(DefaultFields);

impl<'writer> FormatFields<'writer> for FileFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: Writer<'writer>,
        fields: R,
    ) -> stdfmt::Result {
        self.0.format_fields(writer, fields)
    }
}

// ---------------------------------------------------------------------------
// DomainFormat
// ---------------------------------------------------------------------------

/// Plain-text format with the `domain` field lifted into a prefix:
///
/// ```text
/// 2026-10-16T09:12:44Z DEBUG [doc] matching document events shape="epcis-document" events=3
/// ```
///
/// Events without a `domain` field are printed without the prefix.
pub(crate) struct DomainFormat {
    timer: SystemTime,
}

impl Default for DomainFormat {
    fn default() -> Self {
        Self { timer: SystemTime }
    }
}

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = writer.has_ansi_escapes();

        let mut timestamp = String::new();
        if self.timer.format_time(&mut Writer::new(&mut timestamp)).is_err() {
            timestamp.push_str("<unknown time>");
        }
        styled(&mut writer, ansi, "2", &timestamp)?;

        let level = *event.metadata().level();
        writer.write_char(' ')?;
        styled(&mut writer, ansi, level_style(level), format_args!("{level:>5}"))?;
        writer.write_char(' ')?;

        let mut fields = EventFields::default();
        event.record(&mut fields);

        if let Some(ref domain) = fields.domain {
            styled(&mut writer, ansi, "1;36", format_args!("[{domain}]"))?;
            writer.write_char(' ')?;
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                styled(&mut writer, ansi, "1", span.name())?;
                let ext = span.extensions();
                match ext.get::<FormattedFields<N>>() {
                    Some(f) if !f.is_empty() => write!(writer, "{{{f}}}: ")?,
                    _ => write!(writer, "{{}}: ")?,
                }
            }
        }

        writer.write_str(&fields.message)?;
        if !fields.rest.is_empty() {
            writer.write_char(' ')?;
            styled(&mut writer, ansi, "3", &fields.rest)?;
        }
        writeln!(writer)
    }
}

fn level_style(level: Level) -> &'static str {
    match level {
        Level::ERROR => "31",
        Level::WARN => "33",
        Level::INFO => "32",
        Level::DEBUG => "34",
        Level::TRACE => "35",
    }
}

fn styled(
    writer: &mut Writer<'_>,
    ansi: bool,
    style: &str,
    text: impl stdfmt::Display,
) -> stdfmt::Result {
    if ansi {
        write!(writer, "\x1b[{style}m{text}\x1b[0m")
    } else {
        write!(writer, "{text}")
    }
}

/// Splits an event's fields into domain, message, and everything else.
#[derive(Default)]
struct EventFields {
    domain: Option<String>,
    message: String,
    rest: String,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message.push_str(value),
            _ => self.record_debug(field, &value),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "message" => {
                write!(self.message, "{value:?}").ok();
            }
            "domain" => {
                self.domain = Some(format!("{value:?}").trim_matches('"').to_string());
            }
            name => {
                if !self.rest.is_empty() {
                    self.rest.push(' ');
                }
                write!(self.rest, "{name}={value:?}").ok();
            }
        }
    }
}
