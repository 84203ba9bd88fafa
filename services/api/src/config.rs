//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. The model API credential is special: it
//! may arrive from the environment, from the stored credential file, or
//! interactively over the protocol, in that order of precedence.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which remote provider the gateway builds its adapter for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
    OpenAi,
}

impl ModelProvider {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }

    /// The model identifier used when `MODEL_ID` is not set.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    /// The environment variable this provider's credential is read from.
    fn key_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub allowed_origin: HeaderValue,
    pub provider: ModelProvider,
    pub default_model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub credential_path: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin_str = std::env::var("ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let allowed_origin = allowed_origin_str.parse::<HeaderValue>().map_err(|e| {
            ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string())
        })?;

        // --- Load Model Provider Settings ---
        let provider_str = std::env::var("MODEL_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
        let provider = ModelProvider::parse(&provider_str).ok_or_else(|| {
            ConfigError::InvalidValue(
                "MODEL_PROVIDER".to_string(),
                format!("'{}' is not a known provider (gemini, openai)", provider_str),
            )
        })?;

        let default_model = std::env::var("MODEL_ID")
            .unwrap_or_else(|_| provider.default_model().to_string());

        // The credential is optional here: when absent it can still be restored
        // from the credential file or provided interactively over the protocol.
        let api_key = std::env::var(provider.key_var()).ok();

        let api_base = std::env::var("MODEL_API_BASE").ok();

        let credential_path = std::env::var("CREDENTIAL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.workbench_credential"));

        Ok(Self {
            bind_address,
            log_level,
            allowed_origin,
            provider,
            default_model,
            api_key,
            api_base,
            credential_path,
        })
    }
}

/// Reads a previously stored credential, if any. Whitespace is trimmed; an
/// empty or unreadable file counts as no credential.
pub async fn load_stored_credential(path: &Path) -> Option<String> {
    let contents = tokio::fs::read_to_string(path).await.ok()?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Persists an interactively provided credential so later sessions skip the
/// entry prompt.
pub async fn store_credential(path: &Path, secret: &str) -> std::io::Result<()> {
    tokio::fs::write(path, secret).await
}
