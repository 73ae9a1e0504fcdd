//! Logging setup for toolstep.
//!
//! Events go to stderr and, optionally, to a daily rolling file under the
//! local data directory. `RUST_LOG` overrides the configured level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Logging configuration.
///
/// # Example
///
/// ```rust
/// use toolstep::logging::{LogLevel, LoggingConfig};
///
/// let config = LoggingConfig::new()
///     .with_level(LogLevel::Debug)
///     .with_log_dir("/tmp/toolstep-logs");
/// assert!(config.file);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether to install a subscriber at all.
    pub enabled: bool,
    /// Whether to also write to a rolling log file.
    pub file: bool,
    /// Log files are named `{app_name}.log` with daily rotation.
    pub app_name: String,
    /// Custom log directory. If None, uses the local data dir + "toolstep/logs".
    pub log_dir: Option<PathBuf>,
    /// Level used when `RUST_LOG` is unset.
    pub level: LogLevel,
}

impl LoggingConfig {
    /// Creates a LoggingConfig with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a disabled logging configuration.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Logs to stderr only.
    #[must_use]
    pub fn without_file(mut self) -> Self {
        self.file = false;
        self
    }

    /// Sets the application name for log file naming.
    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Sets a custom log directory.
    #[must_use]
    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(path.into());
        self
    }

    /// Sets the level filter.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Resolves the directory log files are written to.
    ///
    /// # Errors
    ///
    /// Returns an error if no `log_dir` is set and the platform has no local
    /// data directory.
    pub fn resolve_log_dir(&self) -> Result<PathBuf, LoggingError> {
        if let Some(ref dir) = self.log_dir {
            return Ok(dir.clone());
        }

        dirs::data_local_dir()
            .map(|dir| dir.join("toolstep").join("logs"))
            .ok_or_else(LoggingError::no_data_dir)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: true,
            app_name: "toolstep".to_string(),
            log_dir: None,
            level: LogLevel::default(),
        }
    }
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debug level.
    Debug,
    /// Default.
    #[default]
    Info,
    /// Warn level.
    Warn,
    /// Least verbose.
    Error,
}

impl LogLevel {
    /// Converts to a tracing_subscriber LevelFilter.
    #[must_use]
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
        }
    }
}

/// Keeps the non-blocking file writer alive; pending lines flush on drop.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl fmt::Debug for LoggingGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingGuard").finish_non_exhaustive()
    }
}

static LOGGING_GUARD: std::sync::OnceLock<LoggingGuard> = std::sync::OnceLock::new();

/// Errors that can occur during logging initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingError {
    /// The specific error that occurred.
    pub kind: LoggingErrorKind,
}

/// Specific logging error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingErrorKind {
    /// No local data directory to put log files in.
    NoDataDir,
    /// Failed to create the log directory.
    CreateDirFailed {
        /// The path that could not be created.
        path: PathBuf,
        /// The reason for failure.
        reason: String,
    },
    /// A global subscriber could not be installed.
    SubscriberInitFailed {
        /// The reason for failure.
        reason: String,
    },
}

impl LoggingError {
    /// Creates a new LoggingError with the given kind.
    #[must_use]
    pub fn new(kind: LoggingErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an error for a missing data directory.
    #[must_use]
    pub fn no_data_dir() -> Self {
        Self::new(LoggingErrorKind::NoDataDir)
    }

    /// Creates an error for failed directory creation.
    #[must_use]
    pub fn create_dir_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::CreateDirFailed {
            path,
            reason: reason.into(),
        })
    }

    /// Creates an error for subscriber initialization failure.
    #[must_use]
    pub fn subscriber_init_failed(reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::SubscriberInitFailed {
            reason: reason.into(),
        })
    }

    /// Returns true if this is a missing data directory error.
    #[must_use]
    pub fn is_no_data_dir(&self) -> bool {
        matches!(self.kind, LoggingErrorKind::NoDataDir)
    }
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LoggingErrorKind::NoDataDir => write!(
                f,
                "could not determine a local data directory; set log_dir or disable file logging"
            ),
            LoggingErrorKind::CreateDirFailed { path, reason } => write!(
                f,
                "failed to create log directory '{}': {}; check permissions",
                path.display(),
                reason
            ),
            LoggingErrorKind::SubscriberInitFailed { reason } => write!(
                f,
                "failed to initialize tracing subscriber: {}; a subscriber may already be set",
                reason
            ),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Installs the global subscriber.
///
/// Returns `Ok(false)` when logging is disabled or was already initialized
/// by an earlier call.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or another
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, LoggingError> {
    if !config.enabled || LOGGING_GUARD.get().is_some() {
        return Ok(false);
    }

    let filter = EnvFilter::builder()
        .with_default_directive(config.level.to_filter().into())
        .from_env_lossy();
    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if !config.file {
        return tracing_subscriber::registry()
            .with(stderr.with_filter(filter))
            .try_init()
            .map(|()| true)
            .map_err(|e| LoggingError::subscriber_init_failed(e.to_string()));
    }

    let log_dir = config.resolve_log_dir()?;
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| LoggingError::create_dir_failed(log_dir.clone(), e.to_string()))?;

    let appender = tracing_appender::rolling::daily(&log_dir, format!("{}.log", config.app_name));
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            stderr
                .and_then(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(false),
                )
                .with_filter(filter),
        )
        .try_init()
        .map_err(|e| LoggingError::subscriber_init_failed(e.to_string()))?;

    let _ = LOGGING_GUARD.set(LoggingGuard { _guard: guard });
    Ok(true)
}
