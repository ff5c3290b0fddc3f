//! Configuration file discovery and loading.

use crate::config::schema::SetupConfig;
use crate::error::{Result, SetupError};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the home directory holding user configuration.
pub const CONFIG_DIR: &str = ".wrkmon-setup";

/// Find the user's config at `~/.wrkmon-setup/config.yml`.
pub fn find_user_config() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(CONFIG_DIR).join("config.yml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<SetupConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SetupError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SetupError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`SetupConfig`].
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<SetupConfig> {
    if content.trim().is_empty() {
        return Ok(SetupConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| SetupError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// An explicit path must exist. Without one, the user config is used when
/// present and the defaults otherwise.
pub fn load_config(config_override: Option<&Path>) -> Result<SetupConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => match find_user_config() {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                load_config_file(&path)
            }
            None => Ok(SetupConfig::default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_config_file_parses_valid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "package:\n  name: wrkmon\n  module: wrkmon\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.package.module, "wrkmon");
    }

    #[test]
    fn load_config_file_returns_not_found_error() {
        let result = load_config_file(Path::new("/nonexistent/config.yml"));
        assert!(matches!(result, Err(SetupError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_config_returns_parse_error_for_invalid_yaml() {
        let result = parse_config("settings: [unclosed", Path::new("test.yml"));
        assert!(matches!(result, Err(SetupError::ConfigParseError { .. })));
    }

    #[test]
    fn empty_file_is_default_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "").unwrap();

        assert_eq!(load_config_file(&path).unwrap(), SetupConfig::default());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/wrkmon-setup.yml")));
        assert!(matches!(result, Err(SetupError::ConfigNotFound { .. })));
    }

    #[test]
    fn explicit_path_overrides_user_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yml");
        fs::write(&path, "python:\n  min_version: \"3.11\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.python.min_version, "3.11");
    }
}
