//! Per-name logger registry.
//!
//! [`logger`] memoizes one [`BackendLogger`] per name. Each logger caches
//! the threshold the active configuration assigns to it, tagged with the
//! configuration generation, and re-resolves after any installation.

use std::error::Error;
use std::fmt::Arguments;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::level_filters::LevelFilter;

use super::config::{normalize_name, Threshold};
use super::context::ContextTags;
use crate::log::LogLevel;

/// `tracing` target of every record emitted through the registry.
pub const LOG_TARGET: &str = "logbridge";

const UNRESOLVED: u64 = u64::MAX;

/// `tracing::event!` at a runtime level; fatal records carry `fatal = true`.
macro_rules! dispatch {
    ($level:expr, $($fields:tt)+) => {
        match $level {
            LogLevel::Trace => {
                tracing::event!(target: LOG_TARGET, tracing::Level::TRACE, $($fields)+)
            }
            LogLevel::Debug => {
                tracing::event!(target: LOG_TARGET, tracing::Level::DEBUG, $($fields)+)
            }
            LogLevel::Info => {
                tracing::event!(target: LOG_TARGET, tracing::Level::INFO, $($fields)+)
            }
            LogLevel::Warn => {
                tracing::event!(target: LOG_TARGET, tracing::Level::WARN, $($fields)+)
            }
            LogLevel::Error => {
                tracing::event!(target: LOG_TARGET, tracing::Level::ERROR, $($fields)+)
            }
            LogLevel::Fatal => {
                tracing::event!(target: LOG_TARGET, tracing::Level::ERROR, fatal = true, $($fields)+)
            }
        }
    };
}

static LOGGERS: OnceLock<DashMap<String, Arc<BackendLogger>>> = OnceLock::new();

/// The backend logger for `name`, created on first use.
pub fn logger(name: &str) -> Arc<BackendLogger> {
    let loggers = LOGGERS.get_or_init(DashMap::new);
    if let Some(existing) = loggers.get(name) {
        return Arc::clone(existing.value());
    }
    loggers
        .entry(name.to_string())
        .or_insert_with(|| Arc::new(BackendLogger::new(name)))
        .value()
        .clone()
}

/// Backend side of a named logger.
#[derive(Debug)]
pub struct BackendLogger {
    name: Arc<str>,
    key: String,
    /// `generation << 8 | encoded threshold`, or `UNRESOLVED`.
    threshold: AtomicU64,
}

impl BackendLogger {
    fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            key: normalize_name(name),
            threshold: AtomicU64::new(UNRESOLVED),
        }
    }

    /// Name the logger was requested under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gate assigned by the active configuration.
    pub fn threshold(&self) -> Threshold {
        let generation = super::generation();
        let cached = self.threshold.load(Ordering::Acquire);
        if cached != UNRESOLVED && cached >> 8 == generation {
            return decode(cached as u8);
        }

        let resolved = match super::configuration() {
            Some(config) => config.threshold_for(&self.key),
            None => Threshold::Unconfigured,
        };
        self.threshold
            .store((generation << 8) | u64::from(encode(resolved)), Ordering::Release);
        resolved
    }

    /// Whether a record at `level` passes both the configured threshold
    /// and `tracing`'s global max level.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.threshold().allows(level) && LevelFilter::current() >= to_tracing(level)
    }

    /// Emit one record; the caller has already checked [`Self::is_enabled`].
    pub fn emit(
        &self,
        level: LogLevel,
        args: Arguments<'_>,
        tags: Option<&ContextTags>,
        error: Option<&dyn Error>,
    ) {
        let name = &*self.name;
        let tags = tags.filter(|tags| !tags.is_empty());

        match (tags, error) {
            (None, None) => dispatch!(level, logger = name, "{}", args),
            (Some(tags), None) => {
                let tags = tags.display();
                dispatch!(level, logger = name, context = %tags, "{}", args)
            }
            (None, Some(error)) => dispatch!(level, logger = name, error = %error, "{}", args),
            (Some(tags), Some(error)) => {
                let tags = tags.display();
                dispatch!(
                    level,
                    logger = name,
                    context = %tags,
                    error = %error,
                    "{}",
                    args
                )
            }
        }
    }
}

/// Map a level onto `tracing`, which has no fatal tier.
pub fn to_tracing(level: LogLevel) -> tracing::Level {
    match level {
        LogLevel::Trace => tracing::Level::TRACE,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Error | LogLevel::Fatal => tracing::Level::ERROR,
    }
}

fn encode(threshold: Threshold) -> u8 {
    match threshold {
        Threshold::Unconfigured => 0,
        Threshold::Off => 1,
        Threshold::Min(level) => 2 + level as u8,
    }
}

fn decode(code: u8) -> Threshold {
    match code {
        0 => Threshold::Unconfigured,
        1 => Threshold::Off,
        n => LogLevel::ALL
            .get(usize::from(n - 2))
            .map_or(Threshold::Off, |level| Threshold::Min(*level)),
    }
}
