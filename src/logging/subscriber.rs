//! Tracing subscriber setup.
//!
//! Both layers classify events the same way: stage headers, per-item notes,
//! dry-run lines and plain levels. The file layer also remembers which
//! phase each event belongs to, taken from the enclosing [`Head`] span, and
//! writes it into the line.
//!
//! [`Head`]: super::Head
use std::fmt::Write as _;
use std::fs;
use std::io::{IsTerminal as _, Write as _};
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::Context as LayerContext;
use tracing_subscriber::registry::LookupSpan;

use super::utils::{DATETIME, TIME, log_file_path, strip_ansi, utc_now};

pub(super) const STAGE_TARGET: &str = "provision::stage";
pub(super) const NOTE_TARGET: &str = "provision::note";
pub(super) const DRY_RUN_TARGET: &str = "provision::dry_run";
/// Name of the span opened by [`Head`](super::Head).
pub(super) const HEAD_SPAN: &str = "head";

/// Captures one named field of an event or span as text.
struct FieldText {
    name: &'static str,
    text: String,
}

impl FieldText {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            text: String::new(),
        }
    }
}

impl Visit for FieldText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == self.name {
            value.clone_into(&mut self.text);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == self.name {
            self.text.clear();
            let _ = write!(self.text, "{value:?}");
        }
    }
}

/// What an event is, as far as output is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stage,
    Note,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl LineKind {
    fn of(metadata: &Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, NOTE_TARGET) => Self::Note,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Plain-text marker used in the log file.
    const fn file_marker(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::Note => "    - ",
            Self::DryRun => "    [dry run] ",
            Self::Error => "    [error] ",
            Self::Warn => "    [warn] ",
            Self::Debug => "    [debug] ",
            Self::Info => "    ",
        }
    }

    /// Console line for `msg`, coloured when `ansi` is set.
    fn console_line(self, msg: &str, ansi: bool) -> String {
        let paint = |code: &str, text: &str| {
            if ansi {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text.to_string()
            }
        };
        match self {
            Self::Stage => format!("{} {}", paint("1;34", "==>"), paint("1", msg)),
            Self::Note => format!("  {} {msg}", paint("36", "-")),
            Self::DryRun => format!("  {} {msg}", paint("33", "[DRY RUN]")),
            Self::Error => format!("{} {msg}", paint("31", "ERROR")),
            Self::Warn => format!("{}  {msg}", paint("33", "WARN")),
            Self::Info => format!("  {msg}"),
            Self::Debug => format!("  {}", paint("2", msg)),
        }
    }
}

/// Title of the phase a `head` span belongs to, kept in the span's extensions.
struct PhaseScope(String);

/// Appends every event to the persistent log file, plain text, with a
/// timestamp and the enclosing phase title.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Create (truncate) the log file for `command` and write a run header.
    ///
    /// Returns `None` if the file cannot be created.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let mut file = fs::File::create(&path).ok()?;
        let version = option_env!("PROVISION_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        writeln!(
            file,
            "# provision {version} {command}, started {} UTC",
            utc_now(DATETIME)
        )
        .ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }

    fn append(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for FileLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: LayerContext<'_, S>) {
        if attrs.metadata().name() != HEAD_SPAN {
            return;
        }
        let mut title = FieldText::new("title");
        attrs.record(&mut title);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(PhaseScope(title.text));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        let kind = LineKind::of(event.metadata());
        let mut message = FieldText::new("message");
        event.record(&mut message);

        let scope = ctx
            .event_scope(event)
            .and_then(|spans| {
                spans.from_root().find_map(|span| {
                    span.extensions()
                        .get::<PhaseScope>()
                        .map(|phase| format!("[{}] ", phase.0))
                })
            })
            .unwrap_or_default();

        self.append(&format!(
            "[{}] {scope}{}{}",
            utc_now(TIME),
            kind.file_marker(),
            strip_ansi(&message.text)
        ));
    }
}

/// Renders events as provision-style console lines.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut message = FieldText::new("message");
        event.record(&mut message);
        let kind = LineKind::of(event.metadata());
        let line = kind.console_line(&message.text, writer.has_ansi_escapes());
        writeln!(writer, "{line}")
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output is filtered by `verbose` (and `RUST_LOG` when set), with
/// warnings and errors on stderr and colour only on a terminal. The file
/// layer always records `debug` and above to
/// `$XDG_CACHE_HOME/provision/<command>.log`. Call once, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(console_level.into())
        .from_env_lossy();

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(make_writer)
        .with_filter(console_filter);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
