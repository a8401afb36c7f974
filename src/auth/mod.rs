//! Credentials, bearer tokens and the request types of the `/auth` routes.

pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::UserProfile;

pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenManager};

lazy_static! {
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// `POST /auth/login` body. Only emptiness is checked here; everything else
/// is decided by the credential lookup.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `POST /auth/register` body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// 3 to 32 characters from `[A-Za-z0-9_-]`.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email, length(max = 120))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Body returned by registration and profile lookup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    pub data: UserProfile,
}

/// Body of a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    /// The JWT to send as `Authorization: Bearer <access_token>`.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Lifetime of the token in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_request_requires_both_fields() {
        let login = |username: &str, password: &str| LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        assert!(login("testuser", "x").validate().is_ok());
        assert!(login("", "password123").validate().is_err());
        assert!(login("testuser", "").validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register("test_user-123", "test@example.com", "secret")
            .validate()
            .is_ok());

        let rejected = [
            register("test user!", "test@example.com", "password123"),
            register("tu", "test@example.com", "password123"),
            register(&"a".repeat(33), "test@example.com", "password123"),
            register("testuser", "testexample.com", "password123"),
            register("testuser", &format!("{}@example.com", "e".repeat(120)), "password123"),
            register("testuser", "test@example.com", "12345"),
        ];
        for request in rejected {
            assert!(request.validate().is_err(), "{:?} should be rejected", request);
        }
    }
}
