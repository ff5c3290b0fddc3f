//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format. Every field has a default, so an empty
//! file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration structure for `config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Global settings
    pub settings: Settings,

    /// The target Python package
    pub package: PackageConfig,

    /// Interpreter requirements
    pub python: PythonConfig,
}

/// Global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default output mode: verbose, normal, quiet, silent
    pub output: OutputMode,

    /// Install without asking
    #[serde(skip_serializing_if = "is_false")]
    pub assume_yes: bool,

    /// Mark optional dependencies as skipped instead of installing them
    #[serde(skip_serializing_if = "is_false")]
    pub skip_optional: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Output verbosity in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Verbose,
    #[default]
    Normal,
    Quiet,
    Silent,
}

/// The Python distribution being bootstrapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Distribution name on PyPI
    pub name: String,

    /// Importable module name
    pub module: String,

    /// JSON metadata endpoint used by `update`
    pub index_url: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "wrkmon".to_string(),
            module: "wrkmon".to_string(),
            index_url: "https://pypi.org/pypi/wrkmon/json".to_string(),
        }
    }
}

/// Interpreter requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Minimum interpreter version, `major.minor[.patch]`
    pub min_version: String,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            min_version: "3.10".to_string(),
        }
    }
}
