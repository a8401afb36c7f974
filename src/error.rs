//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can report ends up here, and every one of them is rendered
//! with the same JSON envelope:
//!
//! ```json
//! { "success": false, "error": "not_found", "message": "Task not found" }
//! ```
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can simply
//! return `Result<_, AppError>`. `From` implementations for the repository, token,
//! validation and hashing errors allow conversion with the `?` operator.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::repository::RepoError;

/// Message sent to clients for failures that must not leak internals.
const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred.";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// The requested resource does not exist (HTTP 404).
    NotFound(String),
    /// A uniqueness constraint was violated, e.g. a username already taken (HTTP 400).
    Duplicate(String),
    /// Storage failed for a reason other than not-found/duplicate (HTTP 500).
    /// The message is already sanitised by the repository layer.
    DatabaseError(String),
    /// The request was well-formed JSON but its values are unacceptable (HTTP 400).
    ValidationError(String),
    /// The request could not be parsed at all (HTTP 400).
    BadRequest(String),
    /// Login failed. Unknown user and wrong password are deliberately identical.
    InvalidCredentials,
    /// Bearer token missing or rejected (HTTP 401).
    Token(TokenError),
    /// The global request quota is exhausted (HTTP 429).
    RateLimited { message: String, retry_after: u64 },
    /// Anything unclassified (HTTP 500). The detail is logged, never sent.
    InternalServerError(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code, e.g. `not_found` or `token_expired`.
    pub error: String,
    /// Human-readable description.
    pub message: String,
    /// Remediation hint, present for authentication failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl AppError {
    /// Machine-readable code placed in the `error` field of the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Duplicate(_) => "duplicate",
            AppError::DatabaseError(_) => "database_error",
            AppError::ValidationError(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Token(err) => err.code(),
            AppError::RateLimited { .. } => "rate_limited",
            AppError::InternalServerError(_) => "unknown_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Duplicate(msg)
            | AppError::DatabaseError(msg)
            | AppError::ValidationError(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::InvalidCredentials => "Invalid username or password".to_string(),
            AppError::Token(err) => err.message().to_string(),
            AppError::RateLimited { message, .. } => message.clone(),
            AppError::InternalServerError(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }

    /// Builds the JSON body sent to the client for this error.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            success: false,
            error: self.code().to_string(),
            message: self.client_message(),
            hint: match self {
                AppError::Token(err) => Some(err.hint().to_string()),
                _ => None,
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Duplicate(msg) => write!(f, "Duplicate: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Token(err) => write!(f, "Unauthorized: {}", err),
            AppError::RateLimited { message, .. } => write!(f, "Too Many Requests: {}", message),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) | AppError::ValidationError(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InternalServerError(detail) = self {
            log::error!("unhandled error: {}", detail);
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::RateLimited { retry_after, .. } = self {
            builder.insert_header((header::RETRY_AFTER, retry_after.to_string()));
        }
        builder.json(self.body())
    }
}

/// Repository failures keep their kind; the message was written by the repository.
impl From<RepoError> for AppError {
    fn from(error: RepoError) -> AppError {
        match error {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Duplicate(msg),
            RepoError::Database(msg) => AppError::DatabaseError(msg),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        AppError::Token(error)
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("password hashing failed: {}", error))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        log::error!("migration failed: {}", error);
        AppError::DatabaseError("Database migration failed".into())
    }
}
