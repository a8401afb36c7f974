use crate::{
    auth::{
        AuthMiddleware, AuthenticatedUserId, LoginRequest, LoginResponse, LogoutResponse,
        RegisterRequest, UserResponse,
    },
    error::{AppError, ErrorBody},
    services::UserService,
};
use actix_web::{cookie::Cookie, get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Name of the cookie some clients keep the access token in.
pub const TOKEN_COOKIE: &str = "access_token_cookie";

/// Register a new user
///
/// Creates a new user account and returns its public profile.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Duplicate username/email or invalid input", body = ErrorBody)
    ),
    tag = "auth",
    security(())
)]
#[post("/register")]
pub async fn register(
    users: web::Data<UserService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let RegisterRequest {
        username,
        email,
        password,
    } = register_data.into_inner();
    let profile = users.register(username, password, email).await?;

    Ok(HttpResponse::Created().json(UserResponse {
        success: true,
        data: profile,
    }))
}

/// Login user
///
/// Authenticates a user and returns a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tag = "auth",
    security(())
)]
#[post("/login")]
pub async fn login(
    users: web::Data<UserService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let LoginRequest { username, password } = login_data.into_inner();
    let issued = users.login(&username, password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        access_token: issued.access_token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}

/// Logout user
///
/// Clears the token cookie. Issued tokens stay valid until they expire.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse)
    ),
    tag = "auth",
    security(())
)]
#[post("/logout")]
pub async fn logout(users: web::Data<UserService>) -> impl Responder {
    let mut cookie = Cookie::new(TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(LogoutResponse {
        success: true,
        message: users.logout().to_string(),
    })
}

/// Current user
///
/// Returns the profile of the user the bearer token was issued to.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody)
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
#[get("/me", wrap = "AuthMiddleware")]
pub async fn me(
    users: web::Data<UserService>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let profile = users.profile(user_id.0).await?;
    Ok(HttpResponse::Ok().json(UserResponse {
        success: true,
        data: profile,
    }))
}
