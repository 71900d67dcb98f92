//! # Logger
//!
//! Installs the process-wide `tracing` subscriber.
//!
//! Two sinks are available: the terminal and a directory of rolling files.
//! Each sink picks its own [`Format`]. Verbosity is a base [`LevelFilter`]
//! plus optional per-target directives; without directives `RUST_LOG` is
//! honored.
//!
//! ## Example
//!
//! ```rust
//! # use envcfg_logger::{Format, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("envcfg")
//!     .level_str("debug")
//!     .unwrap()
//!     .directive("tower_http=info")
//!     .console_format(Format::Full)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const DEFAULT_MAX_FILES: usize = 7;
const FILE_SUFFIX: &str = "log";

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Line format of a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// One short line per event.
    #[default]
    Compact,
    /// Default `tracing-subscriber` format with span context.
    Full,
    /// Newline-delimited JSON.
    Json,
}

#[derive(Debug)]
struct FileSink {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
    format: Format,
}

#[derive(Debug)]
struct Settings {
    level: LevelFilter,
    directives: Vec<String>,
    console: Option<Format>,
    file: Option<FileSink>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            directives: Vec::new(),
            console: Some(Format::Compact),
            file: None,
        }
    }
}

/// Builder state: no name given yet.
#[derive(Debug)]
pub struct Unnamed;
/// Builder state: named, so [`LoggerBuilder::init`] is available.
#[derive(Debug)]
pub struct Named(String);
/// Builder state: terminal output only.
#[derive(Debug)]
pub struct ConsoleOnly;
/// Builder state: rolling file output configured.
#[derive(Debug)]
pub struct WithFile;

mod sealed {
    pub trait State {}
}
impl sealed::State for Unnamed {}
impl sealed::State for Named {}
impl sealed::State for ConsoleOnly {}
impl sealed::State for WithFile {}

/// Type-state builder for the global subscriber.
///
/// [`init`](LoggerBuilder::init) needs a name; rotation settings only exist
/// once [`file`](LoggerBuilder::file) picked a directory.
#[derive(Debug)]
pub struct LoggerBuilder<N: sealed::State = Unnamed, F: sealed::State = ConsoleOnly> {
    settings: Settings,
    name: N,
    sink: PhantomData<F>,
}

impl<F: sealed::State> LoggerBuilder<Unnamed, F> {
    /// Names the logger. The name prefixes log file names.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder { settings: self.settings, name: Named(name.into()), sink: PhantomData }
    }
}

impl<N: sealed::State, F: sealed::State> LoggerBuilder<N, F> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Sets the base level from its name (`trace` through `error`, or `off`).
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an unknown level name.
    pub fn level_str(self, level: &str) -> Result<Self, LoggerError> {
        let parsed = level.trim().parse::<LevelFilter>().map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("Unknown log level '{level}': {e}").into(),
                context: None,
            }
        })?;
        Ok(self.level(parsed))
    }

    /// Adds filter directives such as `envcfg_deploy=debug`. Comma separated
    /// lists are accepted. Any directive disables `RUST_LOG`.
    #[must_use]
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        let directive = directive.into();
        if !directive.trim().is_empty() {
            self.settings.directives.push(directive);
        }
        self
    }

    /// Turns terminal output on or off.
    #[must_use]
    pub fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled.then(|| self.settings.console.unwrap_or_default());
        self
    }

    /// Enables terminal output in `format`.
    #[must_use]
    pub const fn console_format(mut self, format: Format) -> Self {
        self.settings.console = Some(format);
        self
    }

    /// Writes rolling log files into `dir` (created on init).
    pub fn file(self, dir: impl Into<PathBuf>) -> LoggerBuilder<N, WithFile> {
        let mut settings = self.settings;
        settings.file = Some(FileSink {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            format: Format::Full,
        });
        LoggerBuilder { settings, name: self.name, sink: PhantomData }
    }
}

impl<N: sealed::State> LoggerBuilder<N, WithFile> {
    fn sink(&mut self) -> Option<&mut FileSink> {
        self.settings.file.as_mut()
    }

    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(sink) = self.sink() {
            sink.rotation = rotation;
        }
        self
    }

    /// Number of rotated files kept on disk.
    #[must_use]
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(sink) = self.sink() {
            sink.max_files = max;
        }
        self
    }

    #[must_use]
    pub fn file_format(mut self, format: Format) -> Self {
        if let Some(sink) = self.sink() {
            sink.format = format;
        }
        self
    }
}

impl<F: sealed::State> LoggerBuilder<Named, F> {
    /// Installs the global subscriber.
    ///
    /// Hold on to the returned [`Logger`]: dropping it stops the background
    /// file writer.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`]: blank name, no sink enabled,
    ///   zero `max_files` or a malformed directive.
    /// * [`LoggerError::Internal`] / [`LoggerError::Appender`]: the log
    ///   directory cannot be prepared.
    /// * [`LoggerError::Subscriber`]: a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: Named(name), .. } = self;
        check(&settings, &name)?;

        let filter = build_filter(&settings)?;
        let mut layers: Vec<BoxedLayer<_>> = Vec::with_capacity(2);

        if let Some(format) = settings.console {
            layers.push(console_layer(format));
        }

        let (dir, guard) = match &settings.file {
            Some(sink) => {
                let (layer, guard) = file_layer(sink, &name)?;
                layers.push(layer);
                (Some(sink.dir.clone()), Some(guard))
            },
            None => (None, None),
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { dir, guard })
    }
}

/// Installed logging system.
#[must_use = "Dropping this handle stops the background file writer."]
#[derive(Debug)]
pub struct Logger {
    dir: Option<PathBuf>,
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: Unnamed, sink: PhantomData }
    }

    /// Directory the rolling files go to, when file output is on.
    #[must_use]
    pub fn log_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Some(dir) = &self.dir {
            tracing::info!(dir = %dir.display(), "Flushing log files");
        }
    }
}

fn check(settings: &Settings, name: &str) -> Result<(), LoggerError> {
    let problem = if name.trim().is_empty() {
        Some("Logger name cannot be empty")
    } else if settings.console.is_none() && settings.file.is_none() {
        Some("No sink enabled; turn on the console or a log directory")
    } else if settings.file.as_ref().is_some_and(|sink| sink.max_files == 0) {
        Some("max_files must be greater than zero")
    } else {
        None
    };

    match problem {
        Some(message) => {
            Err(LoggerError::InvalidConfiguration { message: message.into(), context: None })
        },
        None => Ok(()),
    }
}

fn build_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    if settings.directives.is_empty() {
        return Ok(builder.from_env_lossy());
    }

    let joined = settings.directives.join(",");
    builder.parse(&joined).map_err(|e| LoggerError::InvalidConfiguration {
        message: e.to_string().into(),
        context: Some(joined.into()),
    })
}

fn console_layer<S>(format: Format) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer().with_ansi(true);
    match format {
        Format::Compact => layer.compact().boxed(),
        Format::Full => layer.boxed(),
        Format::Json => layer.json().boxed(),
    }
}

fn file_layer<S>(sink: &FileSink, name: &str) -> Result<(BoxedLayer<S>, WorkerGuard), LoggerError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fs::create_dir_all(&sink.dir).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Cannot create log directory {}", sink.dir.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(sink.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(FILE_SUFFIX)
        .max_log_files(sink.max_files)
        .build(&sink.dir)
        .context("Rolling file appender")?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    let layer = match sink.format {
        Format::Compact => layer.compact().boxed(),
        Format::Full => layer.boxed(),
        Format::Json => layer.json().boxed(),
    };

    Ok((layer, guard))
}
