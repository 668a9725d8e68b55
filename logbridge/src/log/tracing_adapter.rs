//! Tracing library adapter implementation.

use std::error::Error;
use std::fmt::{self, Arguments};
use std::sync::{Arc, Weak};

use crate::backend::registry::BackendLogger;
use crate::backend::{self, ContextTags};
use crate::factory::{ConfigurationSource, ContextAccessor, FactoryShared};
use crate::log::{LogLevel, Logger};

/// Logger implementation that delegates to the `tracing` crate.
///
/// Each record goes out as a `tracing` event with target
/// [`LOG_TARGET`](crate::backend::LOG_TARGET), a `logger` field carrying
/// this logger's name, and a `context` field rendering the tags of the
/// caller's logical call context.
///
/// Instances come from
/// [`TracingLoggerFactory`](crate::factory::TracingLoggerFactory).
#[derive(Clone)]
pub struct TracingLogger {
    backend: Arc<BackendLogger>,
    accessor: ContextAccessor,
    factory: Weak<FactoryShared>,
}

impl TracingLogger {
    pub(crate) fn new(
        backend: Arc<BackendLogger>,
        accessor: ContextAccessor,
        factory: Weak<FactoryShared>,
    ) -> Self {
        Self {
            backend,
            accessor,
            factory,
        }
    }

    /// Configuration source of the factory that created this logger, while
    /// that factory is alive.
    pub fn factory_source(&self) -> Option<ConfigurationSource> {
        self.factory.upgrade().map(|shared| shared.source.clone())
    }

    fn emit(&self, level: LogLevel, args: Arguments<'_>, error: Option<&dyn Error>) {
        if !self.backend.is_enabled(level) {
            return;
        }

        let include_context = backend::configuration().map_or(true, |c| c.include_context);
        if include_context {
            let tags = self.accessor.current();
            self.backend.emit(level, args, Some(&tags), error);
        } else {
            self.backend.emit(level, args, None, error);
        }
    }
}

impl Logger for TracingLogger {
    fn name(&self) -> &str {
        self.backend.name()
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        self.backend.is_enabled(level)
    }

    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        self.emit(level, args, None);
    }

    fn log_error(&self, level: LogLevel, args: Arguments<'_>, error: &dyn Error) {
        self.emit(level, args, Some(error));
    }

    fn child(&self, name: &str) -> Arc<dyn Logger> {
        let full = format!("{}.{}", self.backend.name(), name);
        Arc::new(Self::new(
            backend::registry::logger(&full),
            self.accessor,
            self.factory.clone(),
        ))
    }

    fn context(&self) -> Option<ContextTags> {
        Some(self.accessor.current())
    }
}

impl fmt::Debug for TracingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingLogger")
            .field("name", &self.backend.name())
            .finish_non_exhaustive()
    }
}
