//! Configuration management for Errand
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/errand/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{ErrandError, Result};

/// Main configuration for Errand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI API configuration
    pub openai: OpenAiConfig,
    /// Browser configuration
    pub browser: BrowserConfig,
    /// Agent configuration
    pub agent: AgentConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// OpenAI API configuration
///
/// The API key itself is never stored here; the client reads
/// `OPENAI_API_KEY` from the environment at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of the API (default: https://api.openai.com/v1)
    pub base_url: String,
    /// Model used to plan and select browser actions
    /// Default: gpt-4o-mini
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Whether browser tools are enabled
    pub enabled: bool,
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Path to a specific browser binary to drive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    /// Default timeout for browser operations in ms
    pub timeout_ms: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum observe→act steps before stopping
    /// Default: 25
    pub max_steps: usize,
    /// Whether to show debug output
    pub debug: bool,
    /// System prompt override
    pub system_prompt: Option<String>,
}

/// Anonymized usage reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether anonymized run events may be recorded
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            browser: BrowserConfig::default(),
            agent: AgentConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("ERRAND_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout_secs: 120,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: env::var("ERRAND_BROWSER_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            session_name: env::var("ERRAND_BROWSER_SESSION")
                .unwrap_or_else(|_| "errand".to_string()),
            headed: env::var("ERRAND_BROWSER_HEADED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            executable: env::var("ERRAND_BROWSER_EXECUTABLE").ok().map(PathBuf::from),
            timeout_ms: 30000,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 25,
            debug: env::var("ERRAND_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            system_prompt: None,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: env::var("ERRAND_TELEMETRY")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("errand")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(ErrandError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ErrandError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ErrandError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Get the chat completions endpoint URL
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.openai.base_url.trim_end_matches('/'))
    }

    /// Get the models listing endpoint URL
    pub fn models_url(&self) -> String {
        format!("{}/models", self.openai.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.timeout_secs, 120);
        assert_eq!(config.agent.max_steps, 25);
        assert_eq!(config.browser.session_name, "errand");
        assert!(config.browser.executable.is_none());
    }

    #[test]
    fn test_endpoint_urls() {
        let mut config = Config::default();
        config.openai.base_url = "https://api.openai.com/v1".to_string();
        assert_eq!(config.chat_url(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(config.models_url(), "https://api.openai.com/v1/models");

        // Trailing slashes must not double up
        config.openai.base_url = "https://api.openai.com/v1/".to_string();
        assert_eq!(config.chat_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("model"));
        assert!(toml_str.contains("session_name"));
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("errand"));
    }
}
