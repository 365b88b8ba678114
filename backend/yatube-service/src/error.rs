/// Error types for Yatube Service
///
/// Every error resolves to a well-defined alternate response: validation
/// failures come back as a 400 with per-field messages (the form re-render),
/// missing resources as a 404, and the two authorization failures as
/// redirects (to the login flow, or to the read-only view of the resource).
use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

/// Result type for yatube-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Field name -> messages, as returned to the submitting user.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Cache operation failed
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Submitted data is empty or invalid
    #[error("Validation error: {}", describe_fields(.0))]
    ValidationError(FieldErrors),

    /// Slug, username or id did not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authenticated but not allowed to touch the resource.
    /// With `redirect_to` set the viewer is sent to the read-only view instead.
    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
        redirect_to: Option<String>,
    },

    /// The action requires a logged-in viewer
    #[error("Authentication required")]
    Unauthenticated { login_url: String },

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        AppError::ValidationError(fields)
    }

    /// Forbidden, resolved by redirecting to `location`.
    pub fn forbidden_redirect(message: impl Into<String>, location: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
            redirect_to: Some(location.into()),
        }
    }

    /// Forbidden, reported as a plain 403 (API clients).
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
            redirect_to: None,
        }
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::CacheError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden {
                redirect_to: Some(_),
                ..
            } => StatusCode::FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Unauthenticated { .. } => StatusCode::FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthenticated { login_url } => redirect(login_url),
            AppError::Forbidden {
                redirect_to: Some(location),
                ..
            } => redirect(location),
            AppError::ValidationError(fields) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Validation error",
                    "status": StatusCode::BAD_REQUEST.as_u16(),
                    "fields": fields,
                }))
            }
            _ => {
                let status = self.status_code();
                let message = if status.is_server_error() {
                    error!(error = %self, "request failed");
                    "Internal server error".to_string()
                } else {
                    self.to_string()
                };
                HttpResponse::build(status).json(serde_json::json!({
                    "error": message,
                    "status": status.as_u16(),
                }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        AppError::ValidationError(fields)
    }
}
