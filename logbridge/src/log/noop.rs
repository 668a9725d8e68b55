//! No-operation logger and factory implementations.

use std::fmt::Arguments;
use std::sync::Arc;

use crate::log::{FactoryError, LogLevel, Logger, LoggerFactory};

/// A logger that discards all messages.
///
/// Useful for:
/// - Unit tests where log output would be noise
/// - Benchmarks where logging overhead should be eliminated
/// - Silent operation modes
///
/// # Example
///
/// ```
/// use logbridge::log::{Logger, NoOpLogger};
/// use std::sync::Arc;
///
/// let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
/// logger.info(format_args!("This message is discarded"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn name(&self) -> &str {
        ""
    }

    #[inline]
    fn is_enabled(&self, _level: LogLevel) -> bool {
        false
    }

    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {
        // Intentionally empty - discard all log messages
    }

    fn child(&self, _name: &str) -> Arc<dyn Logger> {
        Arc::new(NoOpLogger)
    }
}

/// Factory handing out [`NoOpLogger`]s.
///
/// Unlike the tracing-backed factory, level overrides are accepted and
/// ignored: there is nothing to configure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLoggerFactory;

impl LoggerFactory for NullLoggerFactory {
    fn create(&self, name: &str) -> Result<Arc<dyn Logger>, FactoryError> {
        if name.is_empty() {
            return Err(FactoryError::EmptyLoggerName);
        }
        Ok(Arc::new(NoOpLogger))
    }

    fn create_with_level(
        &self,
        name: &str,
        _level: LogLevel,
    ) -> Result<Arc<dyn Logger>, FactoryError> {
        self.create(name)
    }
}
