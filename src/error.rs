// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for Fahz
//!
//! This module defines all error types used throughout the application.

use thiserror::Error;

/// Main error type for Fahz operations
#[derive(Error, Debug)]
pub enum FahzError {
    /// Gateway-related errors (generative backend)
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Attachment intake errors
    #[error("Attachment error: {0}")]
    Attachment(String),

    /// Media store errors
    #[error("Media error: {0}")]
    Media(String),

    /// Terminal UI errors
    #[error("TUI error: {0}")]
    Tui(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failure taxonomy for the generative backend.
///
/// Raw backend errors are classified into these variants by the gateway;
/// anything unclassified surfaces as [`GatewayError::Upstream`] with the
/// original message preserved.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No API credential configured in the environment
    #[error("no API credential found: set {0} in the environment")]
    CredentialMissing(&'static str),

    /// The backend rejected the credential
    #[error("the API credential was rejected by the backend")]
    InvalidCredential,

    /// Requested model not available for this credential
    #[error("model '{0}' was not found or is not available for this credential")]
    ModelUnavailable(String),

    /// Request quota exhausted
    #[error("request quota exhausted")]
    QuotaExceeded,

    /// The model responded without any text
    #[error("the model responded but produced no text")]
    EmptyResponse,

    /// No image payload found in an image-generation response
    #[error("no image data was found in the response")]
    NoImageProduced,

    /// Credential lacks entitlement for video generation
    #[error("video generation access was denied for this credential")]
    AccessDenied,

    /// Catch-all passthrough of the backend message
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl GatewayError {
    /// Build an `Upstream` error from an HTTP status and body text.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Upstream(format!("HTTP {}: {}", status, message.into()))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Upstream(err.to_string())
    }
}

/// Result type alias for Fahz operations
pub type Result<T> = std::result::Result<T, FahzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fahz_error_config() {
        let err = FahzError::Config("bad config".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_fahz_error_attachment() {
        let err = FahzError::Attachment("unreadable file".to_string());
        assert!(err.to_string().contains("Attachment error"));
    }

    #[test]
    fn test_fahz_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FahzError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_fahz_error_from_gateway() {
        let err: FahzError = GatewayError::QuotaExceeded.into();
        assert!(err.to_string().contains("Gateway error"));
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn test_gateway_error_credential_missing() {
        let err = GatewayError::CredentialMissing("GEMINI_API_KEY");
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_gateway_error_model_unavailable() {
        let err = GatewayError::ModelUnavailable("gemini-99".to_string());
        assert!(err.to_string().contains("gemini-99"));
    }

    #[test]
    fn test_gateway_error_upstream_preserves_message() {
        let err = GatewayError::upstream(500, "internal failure");
        assert!(err.to_string().contains("HTTP 500"));
        assert!(err.to_string().contains("internal failure"));
    }

    #[test]
    fn test_gateway_error_debug() {
        let err = GatewayError::NoImageProduced;
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NoImageProduced"));
    }

    #[test]
    fn test_result_type_alias() {
        fn test_fn() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(test_fn().unwrap(), 42);
    }
}
