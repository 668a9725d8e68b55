//! Logger trait definition.

use std::error::Error;
use std::fmt::{self, Arguments};
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::backend::context::ContextTags;

/// Severity of a log record.
///
/// Levels are ordered from most verbose (`Trace`) to most severe (`Fatal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Verbose debugging information
    Trace,
    /// Debugging information
    Debug,
    /// General information
    Info,
    /// Warning messages
    Warn,
    /// Error messages
    Error,
    /// Unrecoverable failures
    Fatal,
}

impl LogLevel {
    /// All levels, most verbose first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Upper-case name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a level name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid log level '{input}' - expected trace, debug, info, warn, error or fatal")]
pub struct LogLevelParseError {
    input: String,
}

impl FromStr for LogLevel {
    type Err = LogLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" | "critical" => Ok(LogLevel::Fatal),
            _ => Err(LogLevelParseError {
                input: s.to_string(),
            }),
        }
    }
}

/// Logging interface for application components.
///
/// Application code depends on this trait only; the implementation behind
/// it is chosen at deployment time by whichever [`LoggerFactory`] the
/// process constructs.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across threads.
///
/// # Example
///
/// ```
/// use logbridge::log::{Logger, NoOpLogger};
/// use logbridge::{log_info, log_debug};
/// use std::sync::Arc;
///
/// let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
/// log_info!(logger, "Application started");
/// log_debug!(logger, "Debug message");
/// ```
///
/// [`LoggerFactory`]: crate::log::LoggerFactory
pub trait Logger: Send + Sync {
    /// Hierarchical name of this logger (e.g. `svc.module`).
    fn name(&self) -> &str;

    /// Whether a record at `level` would be emitted.
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Log a message at the specified level.
    ///
    /// This is the core method that implementations must provide.
    /// The convenience methods (`trace`, `debug`, `info`, `warn`, `error`,
    /// `fatal`) delegate to this method.
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    /// Log a message together with the error that caused it.
    fn log_error(&self, level: LogLevel, args: Arguments<'_>, error: &dyn Error) {
        self.log(level, format_args!("{}: {}", args, error));
    }

    /// Create a logger named `<this name>.<name>`.
    fn child(&self, name: &str) -> Arc<dyn Logger>;

    /// Tags of the caller's current logical call context, if this logger
    /// attaches them to its records.
    fn context(&self) -> Option<ContextTags> {
        None
    }

    /// Log a trace-level message.
    fn trace(&self, args: Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }

    /// Log a debug-level message.
    fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    /// Log an info-level message.
    fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    /// Log a warning-level message.
    fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    /// Log an error-level message.
    fn error(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    /// Log a fatal-level message.
    fn fatal(&self, args: Arguments<'_>) {
        self.log(LogLevel::Fatal, args);
    }

    fn is_trace_enabled(&self) -> bool {
        self.is_enabled(LogLevel::Trace)
    }

    fn is_debug_enabled(&self) -> bool {
        self.is_enabled(LogLevel::Debug)
    }

    fn is_info_enabled(&self) -> bool {
        self.is_enabled(LogLevel::Info)
    }

    fn is_warn_enabled(&self) -> bool {
        self.is_enabled(LogLevel::Warn)
    }

    fn is_error_enabled(&self) -> bool {
        self.is_enabled(LogLevel::Error)
    }

    fn is_fatal_enabled(&self) -> bool {
        self.is_enabled(LogLevel::Fatal)
    }
}

/// Convenience macros for logging with format strings.
///
/// These macros provide a familiar interface similar to `tracing` macros.
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)*) => {
        $logger.trace(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {
        $logger.fatal(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every call it receives.
    #[derive(Default)]
    struct RecordingLogger {
        min_level: Option<LogLevel>,
        records: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for RecordingLogger {
        fn name(&self) -> &str {
            "recording"
        }

        fn is_enabled(&self, level: LogLevel) -> bool {
            self.min_level.map_or(true, |min| level >= min)
        }

        fn log(&self, level: LogLevel, args: Arguments<'_>) {
            self.records.lock().unwrap().push((level, args.to_string()));
        }

        fn child(&self, _name: &str) -> Arc<dyn Logger> {
            Arc::new(RecordingLogger::default())
        }
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(LogLevel::Fatal.to_string(), "FATAL");
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!(" warning ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("critical".parse::<LogLevel>(), Ok(LogLevel::Fatal));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_convenience_methods_map_to_levels() {
        let logger = RecordingLogger::default();
        logger.trace(format_args!("t"));
        logger.debug(format_args!("d"));
        logger.info(format_args!("i"));
        logger.warn(format_args!("w"));
        logger.error(format_args!("e"));
        logger.fatal(format_args!("f"));

        let levels: Vec<LogLevel> = logger
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|(level, _)| *level)
            .collect();
        assert_eq!(levels, LogLevel::ALL.to_vec());
    }

    #[test]
    fn test_macros_format_arguments() {
        let logger = RecordingLogger::default();
        log_info!(logger, "user {} logged in", 42);
        log_fatal!(logger, "shutting down: {}", "disk full");

        let records = logger.records.lock().unwrap();
        assert_eq!(records[0], (LogLevel::Info, "user 42 logged in".to_string()));
        assert_eq!(
            records[1],
            (LogLevel::Fatal, "shutting down: disk full".to_string())
        );
    }

    #[test]
    fn test_log_error_appends_error() {
        let logger = RecordingLogger::default();
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        logger.log_error(LogLevel::Error, format_args!("open failed"), &err);

        let records = logger.records.lock().unwrap();
        assert_eq!(records[0].1, "open failed: missing");
    }

    #[test]
    fn test_level_queries_use_is_enabled() {
        let logger = RecordingLogger {
            min_level: Some(LogLevel::Warn),
            ..Default::default()
        };
        assert!(!logger.is_trace_enabled());
        assert!(!logger.is_info_enabled());
        assert!(logger.is_warn_enabled());
        assert!(logger.is_fatal_enabled());
    }
}
