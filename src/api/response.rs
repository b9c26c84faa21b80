//! Response types for the pricing API.
//!
//! This module defines the error response structures and the mapping
//! from engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let (status, code) = match &error {
            EngineError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            EngineError::UnknownReference { .. } => (StatusCode::NOT_FOUND, "UNKNOWN_REFERENCE"),
            EngineError::CurrencyMismatch { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CURRENCY_MISMATCH")
            }
            // Broken rule content is an operator problem, not the client's.
            EngineError::RuleExpression { .. }
            | EngineError::ExpressionParse { .. }
            | EngineError::UnboundParameter { .. }
            | EngineError::DivisionByZero
            | EngineError::TypeMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "RULE_EVALUATION_ERROR")
            }
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParse { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
        };

        Self {
            status,
            error: ApiError::new(code, error.to_string()),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
