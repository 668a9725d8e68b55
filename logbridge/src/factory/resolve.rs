//! Configuration file discovery.

use std::path::{Path, PathBuf};

use crate::backend::config::ConfigurationError;

/// Name of the configuration file used when none is given.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "logbridge.ini";

/// Directories searched, in order, for a relative configuration path:
/// the application base directory (where the executable lives), the
/// current directory, then the user configuration directory.
pub fn search_directories() -> Vec<PathBuf> {
    let mut search = Vec::new();
    if let Some(base) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        search.push(base);
    }
    if let Ok(cwd) = std::env::current_dir() {
        search.push(cwd);
    }
    if let Some(config) = dirs::config_dir() {
        search.push(config.join("logbridge"));
    }
    search
}

/// Locate `file` on disk.
pub fn resolve(file: &Path) -> Result<PathBuf, ConfigurationError> {
    resolve_in(file, &search_directories())
}

/// Locate `file`, searching `search` when it is relative.
pub fn resolve_in(file: &Path, search: &[PathBuf]) -> Result<PathBuf, ConfigurationError> {
    if file.as_os_str().is_empty() {
        return Err(ConfigurationError::NotFound {
            path: file.to_path_buf(),
        });
    }

    if file.is_absolute() {
        return if file.is_file() {
            Ok(file.to_path_buf())
        } else {
            Err(ConfigurationError::NotFound {
                path: file.to_path_buf(),
            })
        };
    }

    search
        .iter()
        .map(|dir| dir.join(file))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ConfigurationError::NotFound {
            path: file.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_used_as_is() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.ini");
        std::fs::write(&path, "").unwrap();

        assert_eq!(resolve_in(&path, &[]).unwrap(), path);
    }

    #[test]
    fn test_absolute_missing_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.ini");

        assert!(matches!(
            resolve_in(&path, &[]),
            Err(ConfigurationError::NotFound { .. })
        ));
    }

    #[test]
    fn test_relative_path_first_match_wins() {
        let first = tempfile::TempDir::new().unwrap();
        let second = tempfile::TempDir::new().unwrap();
        std::fs::write(second.path().join(DEFAULT_CONFIG_FILE_NAME), "").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let found = resolve_in(Path::new(DEFAULT_CONFIG_FILE_NAME), &dirs).unwrap();
        assert_eq!(found, second.path().join(DEFAULT_CONFIG_FILE_NAME));

        std::fs::write(first.path().join(DEFAULT_CONFIG_FILE_NAME), "").unwrap();
        let found = resolve_in(Path::new(DEFAULT_CONFIG_FILE_NAME), &dirs).unwrap();
        assert_eq!(found, first.path().join(DEFAULT_CONFIG_FILE_NAME));
    }

    #[test]
    fn test_directory_is_not_a_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("logbridge.ini")).unwrap();

        let dirs = vec![temp_dir.path().to_path_buf()];
        assert!(resolve_in(Path::new("logbridge.ini"), &dirs).is_err());
    }

    #[test]
    fn test_empty_path() {
        assert!(resolve_in(Path::new(""), &search_directories()).is_err());
    }
}
