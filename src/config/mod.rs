//! Configuration loading and parsing.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use wrkmon_setup::config::load_config_file;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "settings:\n  skip_optional: true\n").unwrap();
//!
//! let config = load_config_file(&path).unwrap();
//! assert!(config.settings.skip_optional);
//! assert_eq!(config.package.name, "wrkmon");
//! ```
//!
//! # Configuration File Locations
//!
//! 1. `--config <path>` (must exist)
//! 2. User config (`~/.wrkmon-setup/config.yml`), if present
//! 3. Built-in defaults

pub mod loader;
pub mod schema;

pub use loader::{find_user_config, load_config, load_config_file, parse_config, CONFIG_DIR};
pub use schema::{OutputMode, PackageConfig, PythonConfig, Settings, SetupConfig};
