// ABOUTME: Unified error handling with standard error codes and HTTP response mapping
// ABOUTME: Defines AppError and its JSON wire shape shared with the StoryMagic frontend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 StoryMagic

//! Unified error handling
//!
//! Errors that cross the HTTP boundary serialize as `{"detail": "..."}`,
//! the shape the StoryMagic frontend already consumes. Error codes map
//! to HTTP statuses centrally so handlers never pick status codes ad hoc.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Request input failed validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    /// A required field was absent
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField,
    /// The Atris backend returned an error or could not be reached
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError,
    /// Configuration is missing or invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error
    #[must_use]
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidInput | Self::MissingRequiredField => StatusCode::BAD_REQUEST,
            Self::ExternalServiceError => StatusCode::BAD_GATEWAY,
            Self::ConfigError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application error carrying a code and a user-facing message
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    /// Error classification
    pub code: ErrorCode,
    /// Message surfaced in the `detail` field of the response body
    pub message: String,
    /// Status override, used when relaying a backend status verbatim
    status_override: Option<StatusCode>,
}

impl AppError {
    /// Create a new error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status_override: None,
        }
    }

    /// Validation failure on request input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Error relayed from the Atris backend, keeping its HTTP status
    pub fn external_service(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ExternalServiceError,
            message: message.into(),
            status_override: Some(status),
        }
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Effective HTTP status for the response
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.status_override.unwrap_or_else(|| self.code.http_status())
    }
}

/// Wire shape for error responses, matching what the frontend reads
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error description
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let body = ErrorBody {
            detail: self.message,
        };
        (status, Json(body)).into_response()
    }
}

// Transport failures map to 502: the backend gave no answer.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("Atris request failed: {err}"),
        )
    }
}
