//! Runtime configuration
//!
//! Loaded from the TOML file named by `APIVIEW_CONFIG`, else `apiview.toml`
//! in the working directory. A missing file means defaults; a file that
//! exists but does not parse is an error. `RUST_LOG`, when set, overrides
//! the configured filter.
//!
//! ```toml
//! [logging]
//! profile = "production"
//! filter = "apiview=debug"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{ApiViewError, Result};
use crate::logging_facility::{Profile, DEFAULT_FILTER};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "APIVIEW_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "apiview.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_profile")]
    pub profile: Profile,
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_profile() -> Profile {
    Profile::Development
}

fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            filter: default_filter(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text is not a valid configuration.
    pub fn parse(toml_str: &str, origin: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| ApiViewError::Config {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load from `path`; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ApiViewError::Config {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Load from `APIVIEW_CONFIG` or `./apiview.toml`
    ///
    /// # Errors
    ///
    /// Returns `Config` if the selected file cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::from_file(Self::location())
    }

    /// Path `load` reads from
    pub fn location() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}
