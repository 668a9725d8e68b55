//! Tracing-backed logger factory.
//!
//! [`TracingLoggerFactory`] owns the link between abstract logger names and
//! configured backend loggers. Construction runs through
//! `Uninitialized → Configuring → Ready`; any failure ends construction
//! with an error, so a factory value is always `Ready`:
//!
//! 1. Bind the logical context accessor (fails with `AccessorBinding`)
//! 2. Resolve the configuration source (fails with `ConfigurationNotFound`)
//! 3. Install it as the backend's active configuration
//!
//! The backend's configuration slot is process-wide. Construct one factory
//! per process, before logging concurrently.
//!
//! # Example
//!
//! ```no_run
//! use logbridge::factory::TracingLoggerFactory;
//! use logbridge::log::LoggerFactory;
//! use logbridge::log_info;
//!
//! let factory = TracingLoggerFactory::from_file("/etc/myapp/logbridge.ini")?;
//! let logger = factory.create("svc.module")?;
//! factory.context().set("request_id", "abc");
//! log_info!(logger, "handling request");
//! # Ok::<(), logbridge::log::FactoryError>(())
//! ```

mod accessor;
pub mod resolve;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use accessor::{AccessorBindingError, ContextAccessor};
pub use resolve::DEFAULT_CONFIG_FILE_NAME;

use crate::backend::config::{ConfigurationError, LoggingConfiguration};
use crate::backend::context::ContextTags;
use crate::backend::{self, parser, registry};
use crate::log::{FactoryError, LogLevel, Logger, LoggerFactory, TracingLogger};

/// Message carried by the level override failure.
const LEVEL_OVERRIDE_UNSUPPORTED: &str =
    "Logger levels cannot be set at runtime. Please review your configuration file.";

/// Where a factory's configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationSource {
    /// The default file, resolved to this path.
    DefaultFile(PathBuf),
    /// An explicitly named file, resolved to this path.
    File(PathBuf),
    /// An in-memory configuration object.
    Object,
    /// Configured by other code; nothing was installed.
    External,
}

impl fmt::Display for ConfigurationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationSource::DefaultFile(path) => {
                write!(f, "default file {}", path.display())
            }
            ConfigurationSource::File(path) => write!(f, "file {}", path.display()),
            ConfigurationSource::Object => write!(f, "configuration object"),
            ConfigurationSource::External => write!(f, "external"),
        }
    }
}

/// State shared between a factory and the loggers it creates.
#[derive(Debug)]
pub(crate) struct FactoryShared {
    pub(crate) source: ConfigurationSource,
    pub(crate) accessor: ContextAccessor,
}

/// [`LoggerFactory`] that delegates to the `tracing` backend.
#[derive(Debug, Clone)]
pub struct TracingLoggerFactory {
    shared: Arc<FactoryShared>,
}

impl TracingLoggerFactory {
    /// Configure from [`DEFAULT_CONFIG_FILE_NAME`].
    pub fn new() -> Result<Self, FactoryError> {
        Self::configured_externally(false)
    }

    /// Skip configuration entirely when `configured_externally` is true;
    /// otherwise behave like [`Self::new`].
    pub fn configured_externally(configured_externally: bool) -> Result<Self, FactoryError> {
        if !configured_externally {
            return Self::new_in(&resolve::search_directories());
        }

        let accessor = ContextAccessor::bind()?;
        tracing::debug!("Logging configured externally, skipping installation");
        Ok(Self::ready(ConfigurationSource::External, accessor))
    }

    /// [`Self::new`], searching `search` for the default file.
    pub(crate) fn new_in(search: &[PathBuf]) -> Result<Self, FactoryError> {
        let accessor = ContextAccessor::bind()?;
        let path = install_file(Path::new(DEFAULT_CONFIG_FILE_NAME), search)?;
        Ok(Self::ready(ConfigurationSource::DefaultFile(path), accessor))
    }

    /// Configure from `path`; relative paths are searched as described in
    /// [`resolve::search_directories`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FactoryError> {
        let accessor = ContextAccessor::bind()?;
        let path = install_file(path.as_ref(), &resolve::search_directories())?;
        Ok(Self::ready(ConfigurationSource::File(path), accessor))
    }

    /// Install an already-built configuration.
    pub fn from_configuration(config: LoggingConfiguration) -> Result<Self, FactoryError> {
        let accessor = ContextAccessor::bind()?;
        backend::install(config).map_err(FactoryError::InvalidConfiguration)?;
        Ok(Self::ready(ConfigurationSource::Object, accessor))
    }

    fn ready(source: ConfigurationSource, accessor: ContextAccessor) -> Self {
        tracing::debug!(source = %source, "Logger factory ready");
        Self {
            shared: Arc::new(FactoryShared { source, accessor }),
        }
    }

    /// Where this factory's configuration came from.
    pub fn source(&self) -> &ConfigurationSource {
        &self.shared.source
    }

    /// Tags of the caller's current logical call context.
    pub fn context(&self) -> ContextTags {
        self.shared.accessor.current()
    }

    /// Concrete logger for `name`.
    pub fn logger(&self, name: &str) -> Result<TracingLogger, FactoryError> {
        if name.is_empty() {
            return Err(FactoryError::EmptyLoggerName);
        }
        Ok(TracingLogger::new(
            registry::logger(name),
            self.shared.accessor,
            Arc::downgrade(&self.shared),
        ))
    }
}

impl LoggerFactory for TracingLoggerFactory {
    fn create(&self, name: &str) -> Result<Arc<dyn Logger>, FactoryError> {
        Ok(Arc::new(self.logger(name)?))
    }

    /// Always fails: levels come from the configuration only.
    fn create_with_level(
        &self,
        _name: &str,
        _level: LogLevel,
    ) -> Result<Arc<dyn Logger>, FactoryError> {
        Err(FactoryError::Unsupported(LEVEL_OVERRIDE_UNSUPPORTED))
    }
}

/// Resolve, load and install a configuration file, returning its path.
fn install_file(file: &Path, search: &[PathBuf]) -> Result<PathBuf, FactoryError> {
    let not_found = |source: ConfigurationError| FactoryError::ConfigurationNotFound {
        path: file.to_path_buf(),
        source,
    };

    let path = resolve::resolve_in(file, search).map_err(not_found)?;
    tracing::debug!(path = %path.display(), "Loading logging configuration");

    let config = parser::load_file(&path).map_err(not_found)?;
    backend::install(config).map_err(FactoryError::InvalidConfiguration)?;
    Ok(path)
}
