//! Console configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file
//! (`triage_console.toml` in the working directory, or the path in
//! `TRIAGE_CONFIG`), then environment variable overrides:
//!
//! | Variable | Field |
//! |---|---|
//! | `TRIAGE_API_URL` | `api_base_url` |
//! | `TRIAGE_PLAN_URL` | `plan_base_url` |
//! | `TRIAGE_TIMEOUT_SECS` | `request_timeout_secs` |

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the working directory when `TRIAGE_CONFIG` is
/// not set.
pub const DEFAULT_CONFIG_FILE: &str = "triage_console.toml";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ConsoleConfig`].
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment override has an unusable value.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Endpoints and HTTP settings for the console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the reports API (login, reports, analytics, export).
    pub api_base_url: String,
    /// Base URL of the planning service that serves `/api/plan`.
    pub plan_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            plan_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ConsoleConfig {
    /// Loads configuration from the optional config file and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly named config file is
    /// missing, any config file is malformed, or an environment override
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("TRIAGE_CONFIG").ok().map(PathBuf::from);

        let base = match &explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        log::debug!("Loaded console config: {config:?}");
        Ok(config)
    }

    /// Reads a TOML config file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses TOML config text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not valid config TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        Ok(config.normalized())
    }

    /// Applies environment-style overrides, looking each key up through
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `TRIAGE_TIMEOUT_SECS` is not
    /// a positive integer.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TRIAGE_API_URL") {
            self.api_base_url = url;
        }
        if let Some(url) = lookup("TRIAGE_PLAN_URL") {
            self.plan_base_url = url;
        }
        if let Some(value) = lookup("TRIAGE_TIMEOUT_SECS") {
            self.request_timeout_secs = value
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "TRIAGE_TIMEOUT_SECS",
                    value,
                })?;
        }
        Ok(self.normalized())
    }

    fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self.plan_base_url = self.plan_base_url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ConsoleConfig::from_toml_str("api_base_url = \"https://ops.example.org/\"\n")
            .unwrap();
        assert_eq!(config.api_base_url, "https://ops.example.org");
        assert_eq!(config.plan_base_url, ConsoleConfig::default().plan_base_url);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(matches!(
            ConsoleConfig::from_toml_str("request_timeout_secs = \"soon\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: BTreeMap<&str, &str> = [
            ("TRIAGE_PLAN_URL", "http://planner:9000/"),
            ("TRIAGE_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let config = ConsoleConfig::default()
            .with_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.plan_base_url, "http://planner:9000");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = ConsoleConfig::default()
            .with_overrides(|key| (key == "TRIAGE_TIMEOUT_SECS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "TRIAGE_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let path = std::env::temp_dir().join("triage_console_missing_config.toml");
        let _ = std::fs::remove_file(&path);
        let err = ConsoleConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(
            err.to_string()
                .starts_with(&format!("Failed to read {}: ", path.display()))
        );
    }
}
