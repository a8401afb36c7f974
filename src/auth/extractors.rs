use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::{Claims, TokenError};
use crate::error::AppError;

/// Extracts the authenticated user's ID from request extensions.
///
/// Only meaningful on routes wrapped by `AuthMiddleware`, which verifies the
/// bearer token and stores its [`Claims`]. Without them the request is
/// rejected as missing a token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedUserId(claims.sub))),
            None => ready(Err(AppError::Token(TokenError::Missing).into())),
        }
    }
}
