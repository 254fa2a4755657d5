//! Logging setup on top of `tracing`
//!
//! The library only emits events; binaries and tests decide where they go.
//! `init_logging` installs a global subscriber at most once per process.

use once_cell::sync::OnceCell;
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Daily-rotated files `<directory>/<prefix>.YYYY-MM-DD`
    File { directory: String, prefix: String },
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Emit span open/close events
    pub span_events: bool,
    /// Extra filter directives, e.g. "rttimeta=trace"
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `RTTIMETA_LOG_LEVEL`, `RTTIMETA_LOG_FORMAT`
    /// (pretty, compact, json) and `RTTIMETA_LOG_FILE` (log directory).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("RTTIMETA_LOG_LEVEL") {
            config.level = parse_level(&level);
        }
        if let Ok(format) = std::env::var("RTTIMETA_LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "compact" => LogFormat::Compact,
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(directory) = std::env::var("RTTIMETA_LOG_FILE") {
            config.output = LogOutput::File {
                directory,
                prefix: "rttimeta".to_string(),
            };
        }

        config
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Unknown names fall back to INFO
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber.
///
/// Returns the appender guard; keep it alive until exit so buffered events
/// are flushed. Returns `None` if logging was already initialized here or a
/// subscriber was installed by someone else.
pub fn init_logging(config: LogConfig) -> Option<WorkerGuard> {
    let mut guard = None;
    LOGGER_INITIALIZED.get_or_init(|| {
        let (writer, worker) = match &config.output {
            LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
            LogOutput::File { directory, prefix } => {
                tracing_appender::non_blocking(rolling::daily(directory, prefix))
            }
        };

        let span_events = if config.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
            LogFormat::Pretty => fmt::layer()
                .with_writer(writer)
                .pretty()
                .with_span_events(span_events)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .with_writer(writer)
                .compact()
                .with_span_events(span_events)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_writer(writer)
                .json()
                .with_span_events(span_events)
                .boxed(),
        };

        let installed = tracing_subscriber::registry()
            .with(layer)
            .with(build_filter(&config))
            .try_init()
            .is_ok();
        if installed {
            guard = Some(worker);
        }
    });
    guard
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base = EnvFilter::from_default_env().add_directive(config.level.into());

    match &config.filter {
        Some(directives) => directives
            .split(',')
            .filter(|d| !d.trim().is_empty())
            .fold(base, |filter, directive| match directive.trim().parse() {
                Ok(parsed) => filter.add_directive(parsed),
                Err(_) => {
                    tracing::warn!("Invalid filter directive: {}", directive);
                    filter
                }
            }),
        None => base,
    }
}

/// Verbose stderr logging for local debugging
pub fn init_dev_logging() -> Option<WorkerGuard> {
    init_logging(
        LogConfig::new()
            .with_level(Level::DEBUG)
            .with_span_events(true)
            .with_filter("rttimeta=trace"),
    )
}
