//! Backend configuration model.
//!
//! A [`LoggingConfiguration`] decides, per logger name, the minimum level
//! that reaches the output, and describes where and how records are written.

use std::collections::HashSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::log::LogLevel;

/// Root minimum level when none is configured.
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Info;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No configuration file at the given location
    #[error("Configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Failed to read or parse the configuration file
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Structurally invalid configuration object
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Failed to prepare the output
    #[error("Failed to prepare log output: {0}")]
    Io(#[from] std::io::Error),
}

/// Where formatted records are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    Stdout,
    #[default]
    Stderr,
    File {
        path: PathBuf,
        rotation: FileRotation,
    },
    /// Records are formatted and dropped.
    Discard,
}

/// Rotation policy for file output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileRotation {
    #[default]
    Never,
    Minutely,
    Hourly,
    Daily,
}

/// Record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Full,
    Compact,
    /// Multi-line, for reading in a terminal.
    Pretty,
}

/// Minimum level for a subtree of logger names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerRule {
    /// Normalised dotted prefix; empty for the root (`*`).
    pattern: String,
    /// `None` disables the subtree.
    pub level: Option<LogLevel>,
}

impl LoggerRule {
    /// Rule for `pattern` (`svc.module`, `svc.module.*`, `svc/module` or `*`).
    pub fn new(pattern: &str, level: Option<LogLevel>) -> Self {
        let trimmed = pattern.trim();
        let trimmed = trimmed.strip_suffix(".*").unwrap_or(trimmed);
        let pattern = if trimmed == "*" {
            String::new()
        } else {
            normalize_name(trimmed)
        };
        Self { pattern, level }
    }

    /// Pattern as written in configuration (`*` for the root).
    pub fn pattern(&self) -> &str {
        if self.pattern.is_empty() {
            "*"
        } else {
            &self.pattern
        }
    }

    fn is_root(&self) -> bool {
        self.pattern.is_empty()
    }

    fn segments(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.pattern.split('.').count()
        }
    }

    /// Whether `name` (already normalised) is this rule's prefix or below it.
    fn matches(&self, name: &str) -> bool {
        if self.is_root() {
            return true;
        }
        match name.strip_prefix(self.pattern.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

/// Resolved gate for one logger name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// Nothing installed; defer to whatever `tracing` subscriber is active.
    Unconfigured,
    Off,
    Min(LogLevel),
}

impl Threshold {
    /// Whether a record at `level` passes this gate.
    pub fn allows(&self, level: LogLevel) -> bool {
        match self {
            Threshold::Unconfigured => true,
            Threshold::Off => false,
            Threshold::Min(min) => level >= *min,
        }
    }
}

/// Complete backend configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfiguration {
    /// Root minimum level; `None` disables everything not matched by a rule.
    pub level: Option<LogLevel>,
    pub rules: Vec<LoggerRule>,
    pub output: OutputTarget,
    pub format: OutputFormat,
    /// Emit ANSI colour codes
    pub ansi: bool,
    /// Attach logical context tags to records
    pub include_context: bool,
}

impl Default for LoggingConfiguration {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LEVEL),
            rules: Vec::new(),
            output: OutputTarget::default(),
            format: OutputFormat::default(),
            ansi: false,
            include_context: true,
        }
    }
}

impl LoggingConfiguration {
    /// Set the root level; `None` turns it off.
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self {
        self.level = level;
        self
    }

    /// Add a per-name rule.
    pub fn with_rule(mut self, pattern: &str, level: Option<LogLevel>) -> Self {
        self.rules.push(LoggerRule::new(pattern, level));
        self
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn with_include_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }

    /// Check the object is structurally usable.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !rule.is_root() && rule.pattern.split('.').any(str::is_empty) {
                return Err(ConfigurationError::Invalid(format!(
                    "logger pattern '{}' has an empty segment",
                    rule.pattern
                )));
            }
            if !seen.insert(rule.pattern.as_str()) {
                return Err(ConfigurationError::Invalid(format!(
                    "logger pattern '{}' is configured more than once",
                    rule.pattern()
                )));
            }
        }

        if let OutputTarget::File { path, .. } = &self.output {
            if path.as_os_str().is_empty() || path.file_name().is_none() {
                return Err(ConfigurationError::Invalid(
                    "file output requires a file path".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Level for names no rule matches; a root rule (`*`) overrides
    /// [`Self::level`].
    pub fn root_level(&self) -> Option<LogLevel> {
        self.rules
            .iter()
            .find(|rule| rule.is_root())
            .map_or(self.level, |rule| rule.level)
    }

    /// Gate for the logger called `name`.
    ///
    /// The rule with the most segments matching `name` wins; a root rule
    /// (`*`) overrides [`Self::level`].
    pub fn threshold_for(&self, name: &str) -> Threshold {
        let name = normalize_name(name);
        let level = self
            .rules
            .iter()
            .filter(|rule| rule.matches(&name))
            .max_by_key(|rule| rule.segments())
            .map_or(self.level, |rule| rule.level);

        match level {
            Some(min) => Threshold::Min(min),
            None => Threshold::Off,
        }
    }
}

/// Canonical dotted form of a logger name (`a/b` and `a::b` become `a.b`).
pub fn normalize_name(name: &str) -> String {
    name.trim().replace("::", ".").replace('/', ".")
}
