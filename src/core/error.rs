//! Typed error handling for the HTTP boundary
//!
//! Every failure a request can hit is one variant of [`ApiError`]. Handlers,
//! extractors and middleware return it directly and axum turns it into a JSON
//! response through [`IntoResponse`].
//!
//! # Error Categories
//!
//! - client input: [`ApiError::InvalidId`], [`ApiError::InvalidJson`],
//!   [`ApiError::EmptyUpdate`], [`ApiError::Validation`]
//! - authentication: [`ApiError::Unauthorized`]
//! - lookup: [`ApiError::NotFound`]
//! - store: [`ApiError::Store`], whose cause is logged and never serialized
//! - configuration: [`ApiError::ServiceUnavailable`]
//!
//! The wire format is always `{"message": "..."}`; validation failures add an
//! `errors` array of `{field, message}` objects.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Error type returned by every handler
#[derive(Debug)]
pub enum ApiError {
    /// Path identifier could not be decoded
    InvalidId {
        /// Singular resource label, e.g. "trail"
        resource: &'static str,
    },

    /// Request body is not a JSON object
    InvalidJson { message: String },

    /// Update body carried no recognised field
    EmptyUpdate,

    /// One or more fields failed their rules
    Validation(Vec<FieldValidationError>),

    /// Mutating route reached without an authenticated identity
    Unauthorized,

    /// Well-formed identifier with no matching record
    NotFound {
        /// Capitalised resource label, e.g. "Trail"
        resource: &'static str,
    },

    /// Store adapter failure
    Store {
        /// Client-facing message
        context: String,
        source: anyhow::Error,
    },

    /// A collaborator needed by the route is not configured
    ServiceUnavailable { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldValidationError>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidId { resource } => write!(f, "Invalid {} ID format.", resource),
            ApiError::InvalidJson { message } => write!(f, "Invalid JSON body: {}", message),
            ApiError::EmptyUpdate => write!(f, "At least one field is required to update."),
            ApiError::Validation(_) => write!(f, "Validation failed."),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::NotFound { resource } => write!(f, "{} not found.", resource),
            ApiError::Store { context, .. } => write!(f, "{}", context),
            ApiError::ServiceUnavailable { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Store { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl ApiError {
    /// Wrap a store failure with the message the client will see
    pub fn store(context: impl Into<String>, source: anyhow::Error) -> Self {
        ApiError::Store {
            context: context.into(),
            source,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            ApiError::EmptyUpdate => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable code used in log events
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidId { .. } => "INVALID_ID",
            ApiError::InvalidJson { .. } => "INVALID_JSON",
            ApiError::EmptyUpdate => "EMPTY_UPDATE",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Store { .. } => "STORE_ERROR",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }

    /// Whether the failure was caused by the client
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.to_string(),
            errors: match self {
                ApiError::Validation(errors) => Some(errors.clone()),
                _ => None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store { context, source } => {
                tracing::error!(error = %format!("{:#}", source), "{}", context);
            }
            err if err.is_client_error() => {
                tracing::warn!(code = err.error_code(), status = err.status_code().as_u16(), "{}", err);
            }
            _ => {}
        }

        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// A specialized Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_invalid_id_message_and_status() {
        let err = ApiError::InvalidId { resource: "trail" };
        assert_eq!(err.to_string(), "Invalid trail ID format.");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_message_and_status() {
        let err = ApiError::NotFound { resource: "Gear" };
        assert_eq!(err.to_string(), "Gear not found.");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_response_lists_fields() {
        let err = ApiError::Validation(vec![
            FieldValidationError::new("name", "Name is required"),
            FieldValidationError::new("email", "Must be a valid email"),
        ]);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = err.to_response();
        assert_eq!(response.message, "Validation failed.");
        let errors = response.errors.expect("validation carries field errors");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[1].field, "email");
    }

    #[test]
    fn test_store_error_hides_cause() {
        let err = ApiError::store("Fetching trails failed.", anyhow!("connection refused"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Fetching trails failed." }));
    }

    #[test]
    fn test_empty_update_is_bad_request() {
        let err = ApiError::EmptyUpdate;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "At least one field is required to update.");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_unauthorized_body_is_generic() {
        let body = serde_json::to_value(ApiError::Unauthorized.to_response()).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Unauthorized" }));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::EmptyUpdate.error_code(), "EMPTY_UPDATE");
        assert_eq!(ApiError::Unauthorized.error_code(), "UNAUTHORIZED");
        assert_eq!(
            ApiError::InvalidJson {
                message: "eof".into()
            }
            .error_code(),
            "INVALID_JSON"
        );
    }
}
