//! Trip planner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Startup-time configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{service} API key not found. Set the {env_var} environment variable.")]
    MissingApiKey { service: &'static str, env_var: String },
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative text provider configuration
    pub llm: LlmConfig,

    /// Geocoding and routing provider configuration
    pub geoapify: GeoapifyConfig,

    /// Itinerary policy
    pub planner: PlannerConfig,

    /// Default log level (overridden by --log-level)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Both API keys must be present. Call this before any command touches
    /// the network or opens the interactive session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        debug!("Config::validate: called");
        self.llm.api_key()?;
        self.geoapify.api_key()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tripplanner.yml
        let local_config = PathBuf::from(".tripplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tripplanner/tripplanner.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tripplanner").join("tripplanner.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Read a non-empty secret from the named environment variable
fn read_key(service: &'static str, env_var: &str) -> Result<String, ConfigError> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => {
            debug!(%service, %env_var, "read_key: key missing");
            Err(ConfigError::MissingApiKey {
                service,
                env_var: env_var.to_string(),
            })
        }
    }
}

/// Generative text provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("gemini" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Sampling temperature
    pub temperature: f32,
}

impl LlmConfig {
    pub fn api_key(&self) -> Result<String, ConfigError> {
        read_key("LLM", &self.api_key_env)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            max_tokens: 1024,
            timeout_ms: 60_000,
            temperature: 0.4,
        }
    }
}

/// Geoapify configuration (geocoding + routing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoapifyConfig {
    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Maximum number of city candidates per search
    #[serde(rename = "autocomplete-limit")]
    pub autocomplete_limit: u32,
}

impl GeoapifyConfig {
    pub fn api_key(&self) -> Result<String, ConfigError> {
        read_key("Geoapify", &self.api_key_env)
    }
}

impl Default for GeoapifyConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEOAPIFY_API_KEY".to_string(),
            base_url: "https://api.geoapify.com".to_string(),
            timeout_ms: 15_000,
            autocomplete_limit: 5,
        }
    }
}

/// Itinerary policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of places requested from the model (clamped to 1..=3)
    pub stops: usize,

    /// Routing mode passed to the router
    #[serde(rename = "travel-mode")]
    pub travel_mode: String,

    /// Places farther than this from the city center are dropped (null disables)
    #[serde(rename = "max-distance-km")]
    pub max_distance_km: Option<f64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            stops: 3,
            travel_mode: "walk".to_string(),
            max_distance_km: Some(50.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.geoapify.api_key_env, "GEOAPIFY_API_KEY");
        assert_eq!(config.geoapify.base_url, "https://api.geoapify.com");
        assert_eq!(config.planner.stops, 3);
        assert_eq!(config.planner.travel_mode, "walk");
        assert_eq!(config.planner.max_distance_km, Some(50.0));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: openai
  model: gpt-4o-mini
  api-key-env: MY_LLM_KEY
  base-url: https://api.example.com
  max-tokens: 512
  timeout-ms: 10000
  temperature: 0.1

geoapify:
  api-key-env: MY_GEO_KEY
  autocomplete-limit: 8

planner:
  stops: 2
  travel-mode: bicycle
  max-distance-km: null

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 512);
        assert_eq!(config.geoapify.api_key_env, "MY_GEO_KEY");
        assert_eq!(config.geoapify.autocomplete_limit, 8);
        assert_eq!(config.geoapify.timeout_ms, 15_000);
        assert_eq!(config.planner.stops, 2);
        assert_eq!(config.planner.travel_mode, "bicycle");
        assert_eq!(config.planner.max_distance_km, None);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gemini-2.0-flash
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.geoapify.autocomplete_limit, 5);
        assert_eq!(config.planner.stops, 3);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trip.yml");
        std::fs::write(&path, "planner:\n  stops: 1\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.planner.stops, 1);
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let path = PathBuf::from("/definitely/not/here/tripplanner.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_validate_reports_missing_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "TP_TEST_UNSET_LLM_KEY".to_string();
        config.geoapify.api_key_env = "TP_TEST_UNSET_GEO_KEY".to_string();
        unsafe {
            std::env::remove_var("TP_TEST_UNSET_LLM_KEY");
            std::env::remove_var("TP_TEST_UNSET_GEO_KEY");
        }

        let err = config.validate().unwrap_err();
        match err {
            ConfigError::MissingApiKey { service, env_var } => {
                assert_eq!(service, "LLM");
                assert_eq!(env_var, "TP_TEST_UNSET_LLM_KEY");
            }
        }
    }

    #[test]
    #[serial]
    fn test_validate_rejects_blank_key() {
        let mut config = Config::default();
        config.llm.api_key_env = "TP_TEST_LLM_KEY".to_string();
        config.geoapify.api_key_env = "TP_TEST_GEO_KEY".to_string();
        unsafe {
            std::env::set_var("TP_TEST_LLM_KEY", "llm-secret");
            std::env::set_var("TP_TEST_GEO_KEY", "   ");
        }

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TP_TEST_GEO_KEY"));

        unsafe {
            std::env::set_var("TP_TEST_GEO_KEY", "geo-secret");
        }
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.api_key().unwrap(), "llm-secret");

        unsafe {
            std::env::remove_var("TP_TEST_LLM_KEY");
            std::env::remove_var("TP_TEST_GEO_KEY");
        }
    }
}
