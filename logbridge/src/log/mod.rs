//! Logging abstraction layer.
//!
//! Application code depends on the [`Logger`] and [`LoggerFactory`] traits
//! only. The backend behind them is picked once, at startup, by choosing
//! which factory to construct.
//!
//! # Architecture
//!
//! - `Logger` trait: The interface that all components use for logging
//! - `LoggerFactory` trait: Creates named loggers
//! - `TracingLogger`: Production adapter that delegates to the `tracing` crate
//! - `NoOpLogger` / `NullLoggerFactory`: Silent implementations for tests
//!
//! # Usage
//!
//! Components that need logging should accept an `Arc<dyn Logger>` and use
//! the provided macros:
//!
//! ```
//! use logbridge::log::{Logger, LoggerFactory, NullLoggerFactory};
//! use logbridge::{log_info, log_debug};
//! use std::sync::Arc;
//!
//! struct MyComponent {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! impl MyComponent {
//!     fn new(factory: &dyn LoggerFactory) -> Self {
//!         Self {
//!             logger: factory.create("app.my_component").unwrap(),
//!         }
//!     }
//!
//!     fn do_work(&self) {
//!         log_info!(self.logger, "Starting work");
//!         log_debug!(self.logger, "Work completed");
//!     }
//! }
//!
//! MyComponent::new(&NullLoggerFactory).do_work();
//! ```

mod factory;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use factory::{logger_name_for, FactoryError, LoggerFactory};
pub use noop::{NoOpLogger, NullLoggerFactory};
pub use r#trait::{LogLevel, LogLevelParseError, Logger};
pub use tracing_adapter::TracingLogger;
