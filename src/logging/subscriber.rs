//! Tracing subscriber: a console layer and a log-file layer, both rendering
//! events by [`Channel`].
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

const STAGE_TARGET: &str = "confit::stage";
const DRY_RUN_TARGET: &str = "confit::dry_run";
const DIFF_TARGET: &str = "confit::diff";

/// How an event is rendered, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Stage,
    DryRun,
    Diff,
    Error,
    Warn,
    Info,
    Debug,
}

impl Channel {
    fn of(level: Level, target: &str) -> Self {
        match (level, target) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, DIFF_TARGET) => Self::Diff,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Console text for `msg`, newline-terminated. Diff text is passed
    /// through untouched so pager colouring survives.
    fn console(self, msg: &str) -> String {
        match self {
            Self::Error => format!("\x1b[31merror:\x1b[0m {msg}\n"),
            Self::Warn => format!("\x1b[33mwarning:\x1b[0m {msg}\n"),
            Self::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m\n"),
            Self::DryRun => format!("  \x1b[33m[dry run]\x1b[0m {msg}\n"),
            Self::Diff if msg.ends_with('\n') => msg.to_string(),
            Self::Diff => format!("{msg}\n"),
            Self::Info => format!("  {msg}\n"),
            Self::Debug => format!("  \x1b[2m{msg}\x1b[0m\n"),
        }
    }

    /// Plain log-file line for `msg`, stamped with `ts`.
    fn file_line(self, ts: &str, msg: &str) -> String {
        let msg = strip_ansi(msg);
        let tag = match self {
            Self::Stage => return format!("[{ts}] ==> {msg}"),
            Self::Diff => return format!("[{ts}]     [diff]\n{}", msg.trim_end()),
            Self::DryRun => "[dry run] ",
            Self::Error => "[error] ",
            Self::Warn => "[warn] ",
            Self::Debug => "[debug] ",
            Self::Info => "",
        };
        format!("[{ts}]     {tag}{msg}")
    }
}

/// Pulls the formatted `message` field out of an event.
#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

fn message(event: &tracing::Event<'_>) -> String {
    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);
    visitor.0
}

fn channel(event: &tracing::Event<'_>) -> Channel {
    let metadata = event.metadata();
    Channel::of(*metadata.level(), metadata.target())
}

/// Layer appending every event to `$XDG_CACHE_HOME/confit/<command>.log`,
/// whatever the console verbosity.
#[derive(Debug)]
pub(super) struct LogFile {
    file: Mutex<fs::File>,
}

impl LogFile {
    /// Truncate the log for `command` and write a run header.
    ///
    /// Returns `None` if the cache directory or the file is unavailable;
    /// the run then logs to the console only.
    pub(super) fn open(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("CONFIT_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "# confit {version} {command}, started {} UTC\n",
            format_utc_datetime()
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogFile {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let line = channel(event).file_line(&format_utc_time(), &message(event));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console event format; see [`Channel::console`].
struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        use std::fmt::Write as _;
        writer.write_str(&channel(event).console(&message(event)))
    }
}

/// Install the global subscriber for `command`.
///
/// Warnings and errors go to stderr, everything else at or above the
/// console level to stdout; `verbose` lowers that level to `debug`. Must be
/// called once, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(
            std::io::stderr
                .with_max_level(Level::WARN)
                .and(std::io::stdout.with_min_level(Level::INFO)),
        )
        .with_filter(console_level);
    let file = LogFile::open(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
