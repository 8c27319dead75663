//! Logger builder implementation

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Format, LogConfig, Writer};
use crate::error::{LogError, LogResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: LogConfig,
}

/// Guard that keeps the logger's root span entered
///
/// Drop it only when the process is done logging.
#[derive(Debug)]
pub struct LoggerGuard {
    #[allow(dead_code)]
    root_span: Option<tracing::span::EnteredSpan>,
}

impl LoggerGuard {
    /// Guard that holds nothing, for when a subscriber was already installed
    pub fn noop() -> Self {
        Self { root_span: None }
    }
}

fn make_writer(writer: Writer) -> BoxMakeWriter {
    match writer {
        Writer::Stderr => BoxMakeWriter::new(std::io::stderr),
        Writer::Stdout => BoxMakeWriter::new(std::io::stdout),
    }
}

impl LoggerBuilder {
    /// Create builder from config
    pub fn from_config(config: LogConfig) -> Self {
        Self { config }
    }

    /// Parse the filter directives without installing anything
    pub fn filter(&self) -> LogResult<EnvFilter> {
        EnvFilter::try_new(&self.config.level).map_err(|e| LogError::Filter {
            filter: self.config.level.clone(),
            reason: e.to_string(),
        })
    }

    fn format_layer(&self) -> BoxedLayer {
        let display = &self.config.display;
        let writer = make_writer(self.config.writer);

        match self.config.format {
            Format::Pretty => {
                let layer = fmt::layer()
                    .pretty()
                    .with_writer(writer)
                    .with_ansi(display.colors)
                    .with_target(display.target)
                    .with_file(display.source)
                    .with_line_number(display.source)
                    .with_thread_ids(display.thread_ids);
                if display.time {
                    layer.boxed()
                } else {
                    layer.without_time().boxed()
                }
            }
            Format::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_ansi(display.colors)
                    .with_target(display.target)
                    .with_file(display.source)
                    .with_line_number(display.source)
                    .with_thread_ids(display.thread_ids);
                if display.time {
                    layer.boxed()
                } else {
                    layer.without_time().boxed()
                }
            }
            Format::Json => {
                let layer = fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_current_span(true)
                    .with_span_list(true)
                    .flatten_event(display.flatten)
                    .with_ansi(false)
                    .with_target(display.target)
                    .with_file(display.source)
                    .with_line_number(display.source)
                    .with_thread_ids(display.thread_ids);
                if display.time {
                    layer.boxed()
                } else {
                    layer.without_time().boxed()
                }
            }
        }
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Fails when the filter does not parse or a global subscriber is already
    /// installed.
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = self.filter()?;

        Registry::default()
            .with(self.format_layer().with_filter(filter))
            .try_init()
            .map_err(|e| LogError::Init(e.to_string()))?;

        let fields = &self.config.fields;
        let root_span = (!fields.is_empty()).then(|| {
            tracing::info_span!(
                "keyturn",
                service = fields.service.as_deref().unwrap_or(""),
                env = fields.env.as_deref().unwrap_or(""),
                version = fields.version.as_deref().unwrap_or("")
            )
            .entered()
        });

        Ok(LoggerGuard { root_span })
    }
}
