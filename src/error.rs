//! HTTP-facing error type.
//!
//! [`AppError`] is the single error returned by handlers. Each variant maps to
//! one status code and a stable machine-readable `code` in the JSON envelope:
//!
//! ```json
//! {
//!   "status": "Error",
//!   "error": { "code": "not_found", "message": "Alias not found", "details": { "alias": "abc" } }
//! }
//! ```

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

use crate::api::dto::response::Status;
use crate::application::services::MappingError;

/// Realm announced in `WWW-Authenticate` challenges.
pub const AUTH_REALM: &str = "url-shortener";

#[derive(Serialize)]
struct ErrorBody {
    status: Status,
    error: ErrorInfo,
}

/// Error payload, also embedded in other responses.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    /// No free alias could be allocated within the attempt budget.
    GenerationExhausted { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn generation_exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::GenerationExhausted {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::GenerationExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts into the serializable error payload.
    pub fn to_error_info(self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::Unauthorized { message, details } => ("unauthorized", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::GenerationExhausted { message, details } => {
                ("alias_generation_exhausted", message, details)
            }
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            AppError::Validation { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::GenerationExhausted { message, .. }
            | AppError::Internal { message, .. } => message,
        };
        f.write_str(message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let challenge = matches!(self, AppError::Unauthorized { .. });

        let body = ErrorBody {
            status: Status::Error,
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();

        if challenge {
            let value = format!("Basic realm=\"{AUTH_REALM}\"");
            if let Ok(value) = HeaderValue::from_str(&value) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }

        response
    }
}

impl From<MappingError> for AppError {
    fn from(err: MappingError) -> Self {
        match err {
            MappingError::InvalidInput(reason) => {
                AppError::bad_request("Invalid request", json!({ "reason": reason }))
            }
            MappingError::AliasAlreadyExists(alias) => {
                AppError::conflict("Alias already exists", json!({ "alias": alias }))
            }
            MappingError::AliasGenerationExhausted { attempts } => AppError::generation_exhausted(
                "Failed to generate unique alias, try again",
                json!({ "attempts": attempts }),
            ),
            MappingError::NotFound(alias) => {
                AppError::not_found("Alias not found", json!({ "alias": alias }))
            }
            MappingError::StorageFailure(e) => {
                tracing::error!(error = %e, "storage failure");
                AppError::internal("Internal error", json!({}))
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        AppError::bad_request("Validation failed", details)
    }
}
