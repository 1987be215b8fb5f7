// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for Sitecraft
//!
//! This module defines all error types used throughout the application.

use thiserror::Error;

/// Main error type for Sitecraft operations
#[derive(Error, Debug)]
pub enum SitecraftError {
    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors (missing credentials, unknown model, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (invalid API key)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned a non-success status
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },
}

/// Result type alias for Sitecraft operations
pub type Result<T> = std::result::Result<T, SitecraftError>;

impl From<toml::de::Error> for SitecraftError {
    fn from(err: toml::de::Error) -> Self {
        SitecraftError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for SitecraftError {
    fn from(err: toml::ser::Error) -> Self {
        SitecraftError::Toml(err.to_string())
    }
}
