//! Error types for the gateway.
//!
//! Every variant maps to one HTTP status and a JSON body; see
//! [`BridgeError::status`].

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_registry::{DispatchError, FieldError, RegistryError};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::AuthFailure;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Gateway error taxonomy.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Missing or unusable configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(AuthFailure),

    /// Source exceeded its request budget.
    #[error("Too many requests")]
    RateLimited {
        /// Seconds until the window resets.
        retry_after_secs: u64,
    },

    /// Body is not valid JSON.
    #[error("Invalid JSON body")]
    InvalidJson,

    /// Body exceeds the size cap.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Malformed request shape.
    #[error("{0}")]
    BadRequest(String),

    /// Arguments failed validation.
    #[error("Validation error")]
    Validation {
        /// Per-field problems.
        details: Vec<FieldError>,
    },

    /// Unknown tool.
    #[error("Tool \"{tool}\" not found")]
    NotFound {
        /// Requested name.
        tool: String,
        /// Registered names.
        available: Vec<String>,
    },

    /// A tool handler failed. The message is already sanitized.
    #[error("{0}")]
    Handler(String),

    /// Unexpected internal failure, such as a caught panic.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Tool registry could not be built.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Monitor component could not be built.
    #[error("Monitor error: {0}")]
    Monitor(#[from] bridge_monitor::MonitorError),

    /// Socket or file failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidJson | Self::BadRequest(_) | Self::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Handler(_)
            | Self::Internal(_)
            | Self::Config(_)
            | Self::Registry(_)
            | Self::Monitor(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for this error. Internal details never leave the process.
    pub fn body(&self) -> Value {
        match self {
            // Missing header and wrong scheme look the same to the caller.
            Self::Unauthorized(AuthFailure::InvalidToken) => json!({ "error": "Invalid token" }),
            Self::Unauthorized(_) => json!({ "error": "Missing authorization header" }),
            Self::RateLimited { retry_after_secs } => json!({
                "error": "Too many requests",
                "retryAfter": retry_after_secs,
            }),
            Self::InvalidJson | Self::PayloadTooLarge | Self::BadRequest(_) => {
                json!({ "error": self.to_string() })
            }
            Self::Validation { details } => json!({
                "success": false,
                "error": "Validation error",
                "details": details,
            }),
            Self::NotFound { available, .. } => json!({
                "error": self.to_string(),
                "availableTools": available,
            }),
            Self::Handler(message) => json!({ "success": false, "error": message }),
            Self::Internal(_)
            | Self::Config(_)
            | Self::Registry(_)
            | Self::Monitor(_)
            | Self::Io(_) => json!({ "error": "Internal server error" }),
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body())).into_response();
        if let Self::RateLimited { retry_after_secs } = &self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
        }
        response
    }
}

impl From<DispatchError> for BridgeError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NotFound { tool, available } => Self::NotFound { tool, available },
            DispatchError::Validation(details) => Self::Validation { details },
            DispatchError::Handler(message) => Self::Handler(message),
            DispatchError::BatchTooLarge { .. } => Self::BadRequest(err.to_string()),
        }
    }
}
