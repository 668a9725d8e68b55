//! Logbridge - Logging facade adapter over `tracing`
//!
//! This library bridges an application-facing logging interface onto the
//! `tracing` ecosystem. Configuration comes from an INI file, an in-memory
//! object, or is left to other code; records carry the tags of the caller's
//! logical call context.
//!
//! # Quick Start
//!
//! ```no_run
//! use logbridge::factory::TracingLoggerFactory;
//! use logbridge::log::LoggerFactory;
//! use logbridge::{context, log_info};
//!
//! # async fn run() -> Result<(), logbridge::log::FactoryError> {
//! // Reads logbridge.ini from the executable's directory, the current
//! // directory, or the user configuration directory.
//! let factory = TracingLoggerFactory::new()?;
//! let logger = factory.create("svc.requests")?;
//!
//! context::spawn(async move {
//!     context::set("request_id", "abc");
//!     log_info!(logger, "handling request");
//! })
//! .await
//! .ok();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File
//!
//! ```ini
//! [logging]
//! level = info
//! output = file
//! file = logs/app.log
//! rotation = daily
//! format = compact
//!
//! [loggers]
//! svc.db = debug
//! noisy = off
//! ```

pub mod backend;
pub mod factory;
pub mod log;

pub use backend::context;
pub use backend::LoggingConfiguration;
pub use factory::TracingLoggerFactory;
pub use log::{FactoryError, LogLevel, Logger, LoggerFactory};

/// Version of the logbridge library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_context_reexport() {
        std::thread::spawn(|| {
            context::set("key", 1i64);
            assert_eq!(context::get("key"), Some(context::ContextValue::Int(1)));
        })
        .join()
        .unwrap();
    }
}
