// ABOUTME: Unified error handling with standard error codes and HTTP response formatting
// ABOUTME: Defines AppError, ErrorCode and the JSON error envelope returned by all routes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Unified Error Handling System
//!
//! This module provides a centralized error handling system for the Forma
//! server. It defines standard error codes, their HTTP status mapping and the
//! JSON error envelope so failures look the same across all endpoints.
//!
//! The envelope is `{"ok": false, "error": "<code>", "message": "..."}`.
//! Quota rejections are not errors; they carry their own payload shape and
//! are built directly in the scan routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application.
///
/// The serialized form is the wire label clients match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No resolvable user on the request
    #[serde(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not allowed (admin surface)
    #[serde(rename = "forbidden")]
    Forbidden,
    /// Malformed request body or numeric input
    #[serde(rename = "invalid_body")]
    InvalidBody,
    /// Malformed or unknown identifier in the path
    #[serde(rename = "invalid_id")]
    InvalidId,
    /// Requested resource does not exist or is not owned by the caller
    #[serde(rename = "not_found")]
    NotFound,
    /// Store-layer failure, underlying message preserved
    #[serde(rename = "db_error")]
    DatabaseError,
    /// AI analyzer or payment gateway failure
    #[serde(rename = "external_error")]
    ExternalServiceError,
    /// Configuration error
    #[serde(rename = "config_error")]
    ConfigError,
    /// Anything else
    #[serde(rename = "internal_error")]
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidBody | Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ExternalServiceError => StatusCode::BAD_GATEWAY,
            Self::DatabaseError | Self::ConfigError | Self::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Unauthorized => "Authentication is required to access this resource",
            Self::Forbidden => "You do not have permission to perform this action",
            Self::InvalidBody => "The request body is malformed or contains invalid values",
            Self::InvalidId => "The identifier in the request is malformed",
            Self::NotFound => "The requested resource was not found",
            Self::DatabaseError => "Database operation failed",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// No resolvable user
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Authenticated but not allowed
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Malformed request body
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidBody, message)
    }

    /// Malformed identifier
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidId, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// JSON error envelope shared by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            ok: false,
            error: error.code,
            message: Some(error.message.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "request failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

/// Conversion from `anyhow::Error` to `AppError`
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(ErrorCode::InternalError, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(
            ErrorCode::Unauthorized.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::InvalidBody.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_envelope_labels() {
        let err = AppError::invalid_body("reps must be a positive integer");
        let json = serde_json::to_string(&ErrorResponse::from(&err)).unwrap();
        assert!(json.contains(r#""error":"invalid_body""#));
        assert!(json.contains(r#""ok":false"#));
    }

    #[test]
    fn test_database_error_preserves_message() {
        let err = AppError::database("UNIQUE constraint failed: users.email");
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }
}
