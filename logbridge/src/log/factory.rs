//! Logger factory trait and its error type.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::backend::config::ConfigurationError;
use crate::factory::AccessorBindingError;
use crate::log::{LogLevel, Logger};

/// Errors raised while constructing a factory or creating loggers.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The configuration source does not resolve to a usable configuration.
    #[error("Logging configuration not found at '{}': {source}", path.display())]
    ConfigurationNotFound {
        path: PathBuf,
        source: ConfigurationError,
    },

    /// The backend rejected a configuration object as structurally invalid.
    #[error("Invalid logging configuration: {0}")]
    InvalidConfiguration(#[source] ConfigurationError),

    /// The one-time binding to the backend's context store failed.
    #[error("Failed to bind logical context accessor: {0}")]
    AccessorBinding(#[from] AccessorBindingError),

    /// The backend cannot provide the requested capability.
    #[error("{0}")]
    Unsupported(&'static str),

    /// Logger names must not be empty.
    #[error("Logger name must not be empty")]
    EmptyLoggerName,
}

/// Creates named loggers.
///
/// One factory backs a whole process. Requesting the same name twice yields
/// loggers that behave identically, though not necessarily the same instance.
pub trait LoggerFactory: Send + Sync {
    /// Create a logger for `name`.
    fn create(&self, name: &str) -> Result<Arc<dyn Logger>, FactoryError>;

    /// Create a logger for `name` with its minimum level overridden.
    fn create_with_level(
        &self,
        name: &str,
        level: LogLevel,
    ) -> Result<Arc<dyn Logger>, FactoryError>;

    /// Create a logger named after the path of type `T`.
    ///
    /// ```
    /// use logbridge::log::{LoggerFactory, NullLoggerFactory};
    ///
    /// struct Worker;
    /// let logger = NullLoggerFactory.create_for::<Worker>().unwrap();
    /// # let _ = logger;
    /// ```
    fn create_for<T: ?Sized>(&self) -> Result<Arc<dyn Logger>, FactoryError>
    where
        Self: Sized,
    {
        self.create(&logger_name_for::<T>())
    }
}

/// Dotted logger name for a Rust type (`a::b::Type<X>` becomes `a.b.Type`).
pub fn logger_name_for<T: ?Sized>() -> String {
    let path = std::any::type_name::<T>();
    let path = path.split('<').next().unwrap_or(path);
    path.replace("::", ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    #[allow(dead_code)]
    struct Generic<T>(T);

    #[test]
    fn test_logger_name_for_plain_type() {
        let name = logger_name_for::<Plain>();
        assert!(name.ends_with("log.factory.tests.Plain"), "{name}");
        assert!(!name.contains("::"));
    }

    #[test]
    fn test_logger_name_for_strips_generics() {
        let name = logger_name_for::<Generic<String>>();
        assert!(name.ends_with("tests.Generic"), "{name}");
    }

    #[test]
    fn test_unsupported_message_is_verbatim() {
        let err = FactoryError::Unsupported("not here");
        assert_eq!(err.to_string(), "not here");
    }
}
