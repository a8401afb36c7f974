#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    test, App, Error,
};
use serde_json::{json, Value};
use taskdeck::{rate_limit::RateLimit, routes, AppState, Config};

pub const PASSWORD: &str = "Password123!";

/// Builds the full application, rate limiter included, over `state`.
pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    test::init_service(
        App::new()
            .wrap(RateLimit::new(state.limiter.clone()))
            .configure(|cfg| routes::config(cfg, &state)),
    )
    .await
}

/// Fresh in-memory application with the testing configuration.
pub async fn test_app(
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    init_app(AppState::in_memory(&Config::testing())).await
}

pub fn register_request(username: &str, email: &str) -> Request {
    test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": PASSWORD,
        }))
        .to_request()
}

pub fn login_request(username: &str, password: &str) -> Request {
    test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request()
}

/// Registers `username` and returns a bearer token for it.
pub async fn token_for<S, B>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let email = format!("{username}@example.com");
    let resp = test::call_service(app, register_request(username, &email)).await;
    assert_eq!(resp.status(), 201, "registration of {username} failed");

    let body: Value = test::call_and_read_body_json(app, login_request(username, PASSWORD)).await;
    body["access_token"]
        .as_str()
        .expect("access_token in login response")
        .to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
