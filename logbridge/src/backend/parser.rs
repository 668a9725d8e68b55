//! INI parsing logic for converting `Ini` → `LoggingConfiguration`.
//!
//! This module is the single place where INI key names are mapped to
//! configuration fields.

use std::path::{Path, PathBuf};

use ini::Ini;

use super::config::{
    ConfigurationError, FileRotation, LoggerRule, LoggingConfiguration, OutputFormat,
    OutputTarget,
};
use crate::log::LogLevel;

/// Load a configuration file.
///
/// Relative `file` paths inside it resolve against the file's directory.
pub fn load_file(path: &Path) -> Result<LoggingConfiguration, ConfigurationError> {
    if !path.is_file() {
        return Err(ConfigurationError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ini = Ini::load_from_file(path)?;
    parse_ini(&ini, path.parent())
}

/// Parse configuration text.
pub fn parse_str(content: &str) -> Result<LoggingConfiguration, ConfigurationError> {
    let ini = Ini::load_from_str(content)
        .map_err(|e| ConfigurationError::ReadError(ini::Error::Parse(e)))?;
    parse_ini(&ini, None)
}

/// Parse an `Ini` object into a `LoggingConfiguration`.
///
/// Starts from `LoggingConfiguration::default()` and overlays any values found.
pub(super) fn parse_ini(
    ini: &Ini,
    base_dir: Option<&Path>,
) -> Result<LoggingConfiguration, ConfigurationError> {
    let mut config = LoggingConfiguration::default();

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("level") {
            config.level = parse_level("logging", "level", v)?;
        }
        if let Some(v) = section.get("format") {
            config.format = match v.trim().to_lowercase().as_str() {
                "full" => OutputFormat::Full,
                "compact" => OutputFormat::Compact,
                "pretty" => OutputFormat::Pretty,
                _ => {
                    return Err(invalid(
                        "logging",
                        "format",
                        v,
                        "must be one of: full, compact, pretty",
                    ))
                }
            };
        }
        if let Some(v) = section.get("ansi") {
            config.ansi = parse_bool("logging", "ansi", v)?;
        }
        if let Some(v) = section.get("include_context") {
            config.include_context = parse_bool("logging", "include_context", v)?;
        }

        let rotation = match section.get("rotation") {
            Some(v) => match v.trim().to_lowercase().as_str() {
                "never" => FileRotation::Never,
                "minutely" => FileRotation::Minutely,
                "hourly" => FileRotation::Hourly,
                "daily" => FileRotation::Daily,
                _ => {
                    return Err(invalid(
                        "logging",
                        "rotation",
                        v,
                        "must be one of: never, minutely, hourly, daily",
                    ))
                }
            },
            None => FileRotation::Never,
        };

        if let Some(v) = section.get("output") {
            config.output = match v.trim().to_lowercase().as_str() {
                "stdout" => OutputTarget::Stdout,
                "stderr" => OutputTarget::Stderr,
                "none" => OutputTarget::Discard,
                "file" => {
                    let file = section
                        .get("file")
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .ok_or_else(|| {
                            invalid("logging", "file", "", "required when output = file")
                        })?;
                    OutputTarget::File {
                        path: resolve_relative(file, base_dir),
                        rotation,
                    }
                }
                _ => {
                    return Err(invalid(
                        "logging",
                        "output",
                        v,
                        "must be one of: stdout, stderr, file, none",
                    ))
                }
            };
        }
    }

    // [loggers] section
    if let Some(section) = ini.section(Some("loggers")) {
        for (pattern, v) in section.iter() {
            let level = parse_level("loggers", pattern, v)?;
            config.rules.push(LoggerRule::new(pattern, level));
        }
    }

    config.validate()?;
    Ok(config)
}

fn parse_level(
    section: &str,
    key: &str,
    value: &str,
) -> Result<Option<LogLevel>, ConfigurationError> {
    if value.trim().eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    value.parse::<LogLevel>().map(Some).map_err(|_| {
        invalid(
            section,
            key,
            value,
            "must be one of: trace, debug, info, warn, error, fatal, off",
        )
    })
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn resolve_relative(file: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(file);
    match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse_str("").unwrap();
        assert_eq!(config, LoggingConfiguration::default());
    }

    #[test]
    fn test_full_configuration() {
        let config = parse_str(
            r#"
[logging]
level = warn
format = compact
ansi = yes
include_context = false
output = stdout

[loggers]
svc.module = debug
db = off
"#,
        )
        .unwrap();

        assert_eq!(config.level, Some(LogLevel::Warn));
        assert_eq!(config.format, OutputFormat::Compact);
        assert!(config.ansi);
        assert!(!config.include_context);
        assert_eq!(config.output, OutputTarget::Stdout);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].pattern(), "svc.module");
        assert_eq!(config.rules[0].level, Some(LogLevel::Debug));
        assert_eq!(config.rules[1].level, None);
    }

    #[test]
    fn test_file_output_requires_path() {
        let err = parse_str("[logging]\noutput = file\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidValue { ref key, .. } if key == "file"
        ));
    }

    #[test]
    fn test_file_output_with_rotation() {
        let config =
            parse_str("[logging]\noutput = file\nfile = /var/log/app.log\nrotation = daily\n")
                .unwrap();
        assert_eq!(
            config.output,
            OutputTarget::File {
                path: PathBuf::from("/var/log/app.log"),
                rotation: FileRotation::Daily,
            }
        );
    }

    #[test]
    fn test_invalid_level() {
        let err = parse_str("[logging]\nlevel = loud\n").unwrap_err();
        assert!(err.to_string().contains("logging.level = 'loud'"));
    }

    #[test]
    fn test_invalid_logger_level() {
        let err = parse_str("[loggers]\nsvc = chatty\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidValue { ref section, .. } if section == "loggers"
        ));
    }

    #[test]
    fn test_invalid_output() {
        assert!(parse_str("[logging]\noutput = syslog\n").is_err());
    }

    #[test]
    fn test_invalid_pattern_rejected_by_validation() {
        let err = parse_str("[loggers]\nsvc..x = info\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.ini");
        assert!(matches!(
            load_file(&path),
            Err(ConfigurationError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_file_resolves_relative_output() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("logbridge.ini");
        std::fs::write(&path, "[logging]\noutput = file\nfile = logs/app.log\n").unwrap();

        let config = load_file(&path).unwrap();
        assert_eq!(
            config.output,
            OutputTarget::File {
                path: temp_dir.path().join("logs/app.log"),
                rotation: FileRotation::Never,
            }
        );
    }
}
