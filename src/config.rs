//! Configuration management for tutorchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! It also resolves the inference API credential.

use crate::error::{Result, TutorError};
use crate::registry::ModelRegistry;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Keyring service name under which the API key is stored
pub const KEYRING_SERVICE: &str = "tutorchat";

/// Keyring user name under which the API key is stored
pub const KEYRING_USER: &str = "api_key";

/// Main configuration structure for tutorchat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Inference API settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Chat session defaults
    #[serde(default)]
    pub chat: ChatConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Inference API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key; usually supplied by environment or keyring rather than file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Connect, response-header, and idle-read timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model selected for new sessions (label, identifier, or 1-based index)
    #[serde(default = "default_chat_model")]
    pub default_model: String,
}

fn default_chat_model() -> String {
    ModelRegistry::default_model().to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: default_chat_model(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TutorError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TutorError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("TUTORCHAT_API_BASE") {
            self.provider.api_base = api_base;
        }

        if let Ok(key) = std::env::var("TUTORCHAT_API_KEY") {
            self.provider.api_key = Some(key);
        } else if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.provider.api_key = Some(key);
        }

        if let Ok(timeout) = std::env::var("TUTORCHAT_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.provider.timeout_seconds = v,
                Err(_) => tracing::warn!("Ignoring invalid TUTORCHAT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(model) = std::env::var("TUTORCHAT_MODEL") {
            self.chat.default_model = model;
        }

        if let Ok(bind) = std::env::var("TUTORCHAT_BIND") {
            self.server.bind_address = bind;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let crate::cli::Commands::Serve { bind: Some(bind) } = &cli.command {
            tracing::debug!("Using bind address override: {}", bind);
            self.server.bind_address = bind.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Does not check for the API credential; see [`Config::resolve_api_key`].
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.provider.api_base).map_err(|e| {
            TutorError::Config(format!(
                "provider.api_base is not a valid URL ({}): {}",
                self.provider.api_base, e
            ))
        })?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(TutorError::Config(format!(
                "provider.api_base must use http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        if self.provider.timeout_seconds == 0 {
            return Err(TutorError::Config(
                "provider.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if ModelRegistry::resolve(&self.chat.default_model).is_err() {
            return Err(TutorError::Config(format!(
                "chat.default_model is not a known model: {}",
                self.chat.default_model
            ))
            .into());
        }

        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            return Err(TutorError::Config(format!(
                "server.bind_address is not a socket address: {}",
                self.server.bind_address
            ))
            .into());
        }

        Ok(())
    }

    /// Model identifier new sessions start with
    pub fn default_model_id(&self) -> Result<&'static str> {
        Ok(ModelRegistry::resolve(&self.chat.default_model)?.id)
    }

    /// Resolve the API credential
    ///
    /// Looks at the configured/environment key first and falls back to the OS
    /// keyring.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::MissingCredentials` if no key is available. The
    /// caller treats this as fatal.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.provider.api_key.as_deref() {
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }

        match keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).and_then(|e| e.get_password()) {
            Ok(key) if !key.trim().is_empty() => {
                tracing::debug!("Using API key from keyring");
                Ok(key.trim().to_string())
            }
            Ok(_) | Err(keyring::Error::NoEntry) => Err(missing_credentials()),
            Err(e) => {
                tracing::debug!("Keyring lookup failed: {}", e);
                Err(missing_credentials())
            }
        }
    }
}

fn missing_credentials() -> anyhow::Error {
    TutorError::MissingCredentials(
        "no API key found; set TUTORCHAT_API_KEY (or GROQ_API_KEY) or run `tutorchat auth --key <key>`"
            .to_string(),
    )
    .into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            chat: ChatConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
