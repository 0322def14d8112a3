//! Configuration for llmagent
//!
//! Sources, in increasing precedence:
//! 1. Config file (~/.config/llmagent/config.toml)
//! 2. Environment variables (LLMAGENT_*)
//!
//! Validation happens once at startup, before any provider exists; a
//! missing credential for a provider that needs one is a fatal startup
//! condition, never a streaming error.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("missing required configuration: {0}")]
    MissingRequired(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which provider to use ("mock" or "openrouter")
    pub provider: String,

    /// OpenRouter settings
    pub openrouter: OpenRouterSettings,

    /// MCP server settings
    pub server: ServerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            openrouter: OpenRouterSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

/// OpenRouter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterSettings {
    /// API key (can also use LLMAGENT_OPENROUTER_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to use
    pub model: String,
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gryphe/mythomax-l2-13b".to_string(),
        }
    }
}

/// MCP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen port for the MCP endpoint
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("llmagent")
            .join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    /// Load config from a specific path. A missing file is not an error;
    /// defaults plus environment overrides apply.
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default().with_env_overrides());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config.with_env_overrides())
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(provider) = std::env::var("LLMAGENT_LLM_PROVIDER_TYPE") {
            self.provider = provider;
        }
        if let Ok(key) = std::env::var("LLMAGENT_OPENROUTER_API_KEY") {
            self.openrouter.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("LLMAGENT_OPENROUTER_MODEL") {
            self.openrouter.model = model;
        }
        if let Ok(port) = std::env::var("LLMAGENT_MCP_SERVER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => {
                    tracing::warn!("ignoring unparseable LLMAGENT_MCP_SERVER_PORT '{port}'");
                }
            }
        }
        self
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path())
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.provider.as_str() {
            "mock" => Ok(()),
            "openrouter" => {
                if self.openrouter_api_key().is_none() {
                    return Err(ConfigError::MissingRequired(
                        "LLM provider type is 'openrouter' but LLMAGENT_OPENROUTER_API_KEY is not set"
                            .to_string(),
                    ));
                }
                Ok(())
            }
            other => Err(ConfigError::Invalid(format!(
                "unknown LLM provider type '{other}'; supported types are 'mock' and 'openrouter'"
            ))),
        }
    }

    /// Get the OpenRouter API key (from config or env)
    pub fn openrouter_api_key(&self) -> Option<String> {
        self.openrouter
            .api_key
            .clone()
            .or_else(|| std::env::var("LLMAGENT_OPENROUTER_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.provider, "mock");
        assert_eq!(config.openrouter.model, "gryphe/mythomax-l2-13b");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn mock_provider_needs_no_key() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn openrouter_without_a_key_fails_validation() {
        let config = Config {
            provider: "openrouter".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn openrouter_with_a_key_validates() {
        let mut config = Config {
            provider: "openrouter".to_string(),
            ..Default::default()
        };
        config.openrouter.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_provider_fails_validation() {
        let config = Config {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn toml_round_trip() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(rendered.contains("[openrouter]"));
        assert!(rendered.contains("[server]"));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.provider, "mock");
        assert_eq!(parsed.server.port, 8080);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Config = toml::from_str("provider = \"openrouter\"").unwrap();
        assert_eq!(parsed.provider, "openrouter");
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.openrouter.model, "gryphe/mythomax-l2-13b");
    }
}
