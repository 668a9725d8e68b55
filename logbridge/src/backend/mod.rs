//! Backend logging engine.
//!
//! Formatting and sinks are `tracing-subscriber` and `tracing-appender`.
//! This module supplies the pieces `tracing` itself does not have:
//!
//! - A process-wide active configuration slot ([`install`], [`configuration`])
//! - A per-name logger registry with cached thresholds ([`registry`])
//! - A logical call context tag store ([`context`])
//! - An extension table publishing internals to adapters ([`extension`])
//!
//! The configuration slot is written during startup and read on every
//! enabled-check afterwards. Installing a configuration bumps
//! [`generation`], which makes every logger re-resolve its threshold.

pub mod config;
pub mod context;
pub mod extension;
pub mod output;
pub mod parser;
pub mod registry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

pub use config::{
    ConfigurationError, FileRotation, LoggerRule, LoggingConfiguration, OutputFormat,
    OutputTarget, Threshold, DEFAULT_LEVEL,
};
pub use context::{ContextTags, ContextValue};
pub use output::owns_global_subscriber;
pub use registry::{BackendLogger, LOG_TARGET};

static ACTIVE: RwLock<Option<Arc<LoggingConfiguration>>> = parking_lot::const_rwlock(None);

static GENERATION: AtomicU64 = AtomicU64::new(0);

/// The active configuration, if one was ever installed.
pub fn configuration() -> Option<Arc<LoggingConfiguration>> {
    ACTIVE.read().clone()
}

/// Number of installations so far.
pub fn generation() -> u64 {
    GENERATION.load(Ordering::Acquire)
}

/// Make `config` the active configuration of the process.
///
/// The configuration is validated and its output prepared before anything
/// is replaced; on error the previous configuration stays active.
pub fn install(config: LoggingConfiguration) -> Result<(), ConfigurationError> {
    config.validate()?;
    output::apply(&config)?;

    tracing::debug!(
        level = ?config.level,
        rules = config.rules.len(),
        output = ?config.output,
        "Installing logging configuration"
    );

    *ACTIVE.write() = Some(Arc::new(config));
    GENERATION.fetch_add(1, Ordering::AcqRel);
    Ok(())
}
