//! Output installation.
//!
//! The first installed configuration registers a global `tracing`
//! subscriber whose formatting layer and level filter sit behind reload
//! handles; every later installation swaps both in place:
//! - Stdout, stderr, a (rotating) file, or nowhere
//! - Full, compact or multi-line pretty layout
//! - Root level for every target, except adapter records, which pass at
//!   the most verbose level any rule allows and are gated per logger name
//!
//! If some other global subscriber was registered first, records flow to it
//! and output settings are ignored.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{fmt, reload, Layer, Registry};

use super::config::{
    ConfigurationError, FileRotation, LoggingConfiguration, OutputFormat, OutputTarget,
};
use super::registry::{to_tracing, LOG_TARGET};
use crate::log::LogLevel;

/// Targets of this crate's own lifecycle events; they follow the root level.
const SELF_TARGETS: [&str; 2] = ["logbridge::backend", "logbridge::factory"];

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;
type OutputHandle = reload::Handle<OutputLayer, Registry>;
type OutputStack = Layered<reload::Layer<OutputLayer, Registry>, Registry>;
type FilterHandle = reload::Handle<Targets, OutputStack>;

struct Handles {
    output: OutputHandle,
    filter: FilterHandle,
}

/// `None` once we found a foreign global subscriber.
static HANDLES: OnceLock<Option<Handles>> = OnceLock::new();

/// Route output as `config` describes.
pub(super) fn apply(config: &LoggingConfiguration) -> Result<(), ConfigurationError> {
    let layer = build_layer(config)?;
    let filter = build_filter(config);

    match HANDLES.get() {
        Some(Some(handles)) => {
            handles.output.reload(layer).map_err(reload_error)?;
            handles.filter.reload(filter).map_err(reload_error)
        }
        Some(None) => Ok(()),
        None => {
            install_global(layer, filter);
            Ok(())
        }
    }
}

/// Whether the global `tracing` subscriber is the one installed here.
pub fn owns_global_subscriber() -> bool {
    matches!(HANDLES.get(), Some(Some(_)))
}

fn reload_error(e: reload::Error) -> ConfigurationError {
    ConfigurationError::Io(io::Error::other(e.to_string()))
}

fn install_global(layer: OutputLayer, filter: Targets) {
    let (output_layer, output) = reload::Layer::new(layer);
    let (filter_layer, filter) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(output_layer)
        .with(filter_layer);

    let handles = match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => Some(Handles { output, filter }),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Global tracing subscriber already installed, output settings ignored"
            );
            None
        }
    };
    let _ = HANDLES.set(handles);
}

/// Level filter for `config`.
fn build_filter(config: &LoggingConfiguration) -> Targets {
    let root = level_filter(config.root_level());
    let adapter = config
        .rules
        .iter()
        .map(|rule| level_filter(rule.level))
        .fold(root, Ord::max);

    SELF_TARGETS
        .iter()
        .fold(Targets::new(), |targets, target| targets.with_target(*target, root))
        .with_target(LOG_TARGET, adapter)
        .with_default(root)
}

fn level_filter(level: Option<LogLevel>) -> LevelFilter {
    level.map_or(LevelFilter::OFF, |level| LevelFilter::from_level(to_tracing(level)))
}

fn build_layer(config: &LoggingConfiguration) -> Result<OutputLayer, ConfigurationError> {
    let writer = match &config.output {
        OutputTarget::Stdout => BoxMakeWriter::new(io::stdout),
        OutputTarget::Stderr => BoxMakeWriter::new(io::stderr),
        OutputTarget::Discard => BoxMakeWriter::new(io::sink),
        OutputTarget::File { path, rotation } => {
            BoxMakeWriter::new(file_appender(path, *rotation)?)
        }
    };

    let layer = fmt::layer::<Registry>()
        .with_writer(writer)
        .with_ansi(config.ansi);

    let layer: OutputLayer = match config.format {
        OutputFormat::Full => Box::new(layer),
        OutputFormat::Compact => Box::new(layer.compact()),
        OutputFormat::Pretty => Box::new(layer.pretty()),
    };
    Ok(layer)
}

fn file_appender(
    path: &Path,
    rotation: FileRotation,
) -> Result<RollingFileAppender, ConfigurationError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            ConfigurationError::Invalid(format!("invalid log file path '{}'", path.display()))
        })?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir)?;

    let rotation = match rotation {
        FileRotation::Never => Rotation::NEVER,
        FileRotation::Minutely => Rotation::MINUTELY,
        FileRotation::Hourly => Rotation::HOURLY,
        FileRotation::Daily => Rotation::DAILY,
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|e| ConfigurationError::Io(io::Error::other(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tracing::Level;

    #[test]
    fn test_build_layer_for_every_format() {
        for format in [OutputFormat::Full, OutputFormat::Compact, OutputFormat::Pretty] {
            let config = LoggingConfiguration::default()
                .with_output(OutputTarget::Discard)
                .with_format(format);
            assert!(build_layer(&config).is_ok());
        }
    }

    #[test]
    fn test_filter_applies_root_level_to_other_targets() {
        let config = LoggingConfiguration::default().with_level(Some(LogLevel::Warn));
        let filter = build_filter(&config);

        assert!(filter.would_enable("some_dep", &Level::WARN));
        assert!(!filter.would_enable("some_dep", &Level::DEBUG));
        assert!(!filter.would_enable("logbridge::backend", &Level::DEBUG));
        assert!(!filter.would_enable("logbridge::factory", &Level::INFO));
        assert!(filter.would_enable(LOG_TARGET, &Level::ERROR));
        assert!(!filter.would_enable(LOG_TARGET, &Level::INFO));
    }

    #[test]
    fn test_filter_opens_adapter_target_to_most_verbose_rule() {
        let config = LoggingConfiguration::default()
            .with_level(Some(LogLevel::Error))
            .with_rule("svc.db", Some(LogLevel::Debug))
            .with_rule("svc.noisy", None);
        let filter = build_filter(&config);

        assert!(filter.would_enable(LOG_TARGET, &Level::DEBUG));
        assert!(!filter.would_enable(LOG_TARGET, &Level::TRACE));
        assert!(!filter.would_enable("some_dep", &Level::WARN));
        assert!(!filter.would_enable("logbridge::backend", &Level::DEBUG));
    }

    #[test]
    fn test_filter_honours_root_rule() {
        let config = LoggingConfiguration::default()
            .with_level(Some(LogLevel::Info))
            .with_rule("*", Some(LogLevel::Error));
        let filter = build_filter(&config);

        assert!(!filter.would_enable("some_dep", &Level::WARN));
        assert!(filter.would_enable("some_dep", &Level::ERROR));
    }

    #[test]
    fn test_filter_off_root() {
        let filter = build_filter(&LoggingConfiguration::default().with_level(None));
        assert!(!filter.would_enable("some_dep", &Level::ERROR));
        assert!(!filter.would_enable(LOG_TARGET, &Level::ERROR));
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/deep/app.log");

        file_appender(&path, FileRotation::Never).unwrap();

        assert!(temp_dir.path().join("nested/deep").is_dir());
    }

    #[test]
    fn test_file_appender_rejects_missing_file_name() {
        let result = file_appender(&PathBuf::from("/"), FileRotation::Daily);
        assert!(matches!(result, Err(ConfigurationError::Invalid(_))));
    }
}
