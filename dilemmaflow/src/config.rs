//! Application configuration.
//!
//! Configuration is plain serde data with defaults, loaded from the
//! environment by [`AppConfig::from_env`].

use crate::errors::ConfigError;
use crate::observability::DEFAULT_LOG_FILTER;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "DILEMMAFLOW_MODEL";
/// Environment variable overriding the report directory.
pub const REPORT_DIR_ENV: &str = "DILEMMAFLOW_REPORT_DIR";
/// Environment variable switching logs to JSON lines.
pub const LOG_JSON_ENV: &str = "DILEMMAFLOW_LOG_JSON";
/// Environment variable holding the log filter.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_report_file_name() -> String {
    "BMC_Full_Report.txt".to_string()
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Settings for the Gemini generation backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key sent with every request. Never serialized.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Model name, e.g. `gemini-2.0-flash`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative language API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl GeminiConfig {
    /// Creates a config with the given key and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the endpoint base URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The request timeout as a duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The `generateContent` URL for the configured model, without the key.
    #[must_use]
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Directory reports are written to.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// File name of the plain-text report.
    #[serde(default = "default_report_file_name")]
    pub report_file_name: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,

    /// `EnvFilter` directive for logging.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            report_dir: default_report_dir(),
            report_file_name: default_report_file_name(),
            log_json: false,
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] if `GEMINI_API_KEY` is unset or
    /// blank, and [`ConfigError::Invalid`] for an unreadable flag value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingEnv {
                name: API_KEY_ENV.to_string(),
            })?;

        let mut config = Self::default().with_gemini(GeminiConfig::new(api_key));

        if let Some(model) = lookup(MODEL_ENV).filter(|value| !value.trim().is_empty()) {
            config.gemini.model = model.trim().to_string();
        }
        if let Some(dir) = lookup(REPORT_DIR_ENV).filter(|value| !value.trim().is_empty()) {
            config.report_dir = PathBuf::from(dir.trim());
        }
        if let Some(flag) = lookup(LOG_JSON_ENV) {
            config.log_json = parse_flag(LOG_JSON_ENV, &flag)?;
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|value| !value.trim().is_empty()) {
            config.log_filter = filter;
        }

        Ok(config)
    }

    /// Sets the backend settings.
    #[must_use]
    pub fn with_gemini(mut self, gemini: GeminiConfig) -> Self {
        self.gemini = gemini;
        self
    }

    /// Sets the report directory.
    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Sets the report file name.
    #[must_use]
    pub fn with_report_file_name(mut self, name: impl Into<String>) -> Self {
        self.report_file_name = name.into();
        self
    }

    /// Enables or disables JSON logs.
    #[must_use]
    pub fn with_log_json(mut self, log_json: bool) -> Self {
        self.log_json = log_json;
        self
    }

    /// Full path of the plain-text report.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.report_dir.join(&self.report_file_name)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnv {
                name: "GEMINI_API_KEY".to_string()
            }
        );

        assert!(AppConfig::from_lookup(lookup(&[(API_KEY_ENV, "   ")])).is_err());
    }

    #[test]
    fn test_defaults_from_env() {
        let config = AppConfig::from_lookup(lookup(&[(API_KEY_ENV, "k-123")])).unwrap();

        assert_eq!(config.gemini.api_key, "k-123");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.report_path(), PathBuf::from("./BMC_Full_Report.txt"));
        assert!(!config.log_json);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_overrides_from_env() {
        let config = AppConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "k"),
            (MODEL_ENV, "gemini-1.5-pro"),
            (REPORT_DIR_ENV, "/tmp/reports"),
            (LOG_JSON_ENV, "true"),
            (LOG_FILTER_ENV, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.report_dir, PathBuf::from("/tmp/reports"));
        assert!(config.log_json);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_invalid_flag() {
        let err = AppConfig::from_lookup(lookup(&[(API_KEY_ENV, "k"), (LOG_JSON_ENV, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_generate_url_and_redaction() {
        let config = GeminiConfig::new("secret").with_endpoint("http://localhost:9/v1/");
        assert_eq!(
            config.generate_url(),
            "http://localhost:9/v1/models/gemini-2.0-flash:generateContent"
        );
        assert!(!format!("{config:?}").contains("secret"));
        assert!(!serde_json::to_string(&config).unwrap().contains("secret"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"log_json": true}"#).unwrap();
        assert!(config.log_json);
        assert_eq!(config.report_file_name, "BMC_Full_Report.txt");
        assert_eq!(config.gemini.timeout(), Duration::from_secs(60));
    }
}
