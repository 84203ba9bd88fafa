//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Configuration could not be loaded at startup.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A WebSocket frame could not be sent or received.
    #[error("WebSocket Error: {0}")]
    Websocket(#[from] axum::Error),

    /// Filesystem or network I/O failed (socket bind, credential file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
