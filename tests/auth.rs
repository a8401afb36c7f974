mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskdeck::{auth::TokenManager, AppState, Config};

use common::{bearer, init_app, login_request, register_request, test_app, token_for, PASSWORD};

#[test_log::test(actix_rt::test)]
async fn test_register_login_me_logout_flow() {
    let app = test_app().await;

    let resp = test::call_service(&app, register_request("alice", "alice@example.com")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"]["id"].is_i64());
    assert!(body["data"].get("password_hash").is_none());

    let resp = test::call_service(&app, login_request("alice", PASSWORD)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    let token = body["access_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["username"], "alice");

    let req = test::TestRequest::post().uri("/auth/logout").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({ "success": true, "message": "Logout successful" })
    );
}

#[actix_rt::test]
async fn test_duplicate_username_or_email_rejected() {
    let app = test_app().await;

    let resp = test::call_service(&app, register_request("bob", "bob@example.com")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    for (username, email) in [("bob", "other@example.com"), ("bobby", "bob@example.com")] {
        let resp = test::call_service(&app, register_request(username, email)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{username} / {email}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "duplicate");
        assert_eq!(body["message"], "Username or email already exists");
    }
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let app = test_app().await;

    let test_cases = vec![
        (
            json!({ "email": "test@example.com", "password": PASSWORD }),
            "missing username",
        ),
        (
            json!({ "username": "testuser", "email": "invalid-email", "password": PASSWORD }),
            "invalid email format",
        ),
        (
            json!({ "username": "u", "email": "test@example.com", "password": PASSWORD }),
            "username too short",
        ),
        (
            json!({ "username": "a".repeat(33), "email": "test@example.com", "password": PASSWORD }),
            "username too long",
        ),
        (
            json!({ "username": "user name!", "email": "test@example.com", "password": PASSWORD }),
            "username with invalid chars",
        ),
        (
            json!({ "username": "testuser", "email": "test@example.com", "password": "123" }),
            "password too short",
        ),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{description}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false, "{description}");
    }
}

#[actix_rt::test]
async fn test_malformed_json_gets_error_envelope() {
    let app = test_app().await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app().await;
    token_for(&app, "carol").await;

    let resp = test::call_service(&app, login_request("carol", "wrong-password")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = test::read_body_json(resp).await;

    let resp = test::call_service(&app, login_request("nobody", PASSWORD)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let unknown_user: Value = test::read_body_json(resp).await;

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["error"], "invalid_credentials");
}

#[actix_rt::test]
async fn test_token_errors_have_distinct_codes() {
    let config = Config::testing();
    let expired = TokenManager::new(&config.jwt_secret, chrono::Duration::hours(-2))
        .issue(1)
        .unwrap();
    let foreign = TokenManager::new("some-other-secret", chrono::Duration::hours(1))
        .issue(1)
        .unwrap();
    let app = init_app(AppState::in_memory(&config)).await;

    let cases: Vec<(Option<String>, &str)> = vec![
        (None, "token_missing"),
        (Some("Bearer not-a-jwt".into()), "token_invalid"),
        (Some(format!("Token {expired}")), "token_invalid"),
        (Some(format!("Bearer {foreign}")), "token_invalid"),
        (Some(format!("Bearer {expired}")), "token_expired"),
    ];

    for (header, code) in cases {
        let mut req = test::TestRequest::get().uri("/tasks/");
        if let Some(value) = header {
            req = req.insert_header(("Authorization", value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{code}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], code);
        assert!(body["hint"].is_string(), "{code} should carry a hint");
    }
}

#[actix_rt::test]
async fn test_tokens_issued_before_cutoff_are_revoked() {
    let mut config = Config::testing();
    config.token_revoked_before = Some(chrono::Utc::now().timestamp() + 60);
    let app = init_app(AppState::in_memory(&config)).await;

    let token = token_for(&app, "dave").await;
    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "token_revoked");
}

#[actix_rt::test]
async fn test_token_for_deleted_account_is_not_found() {
    let config = Config::testing();
    let token = TokenManager::new(&config.jwt_secret, chrono::Duration::hours(1))
        .issue(4242)
        .unwrap();
    let app = init_app(AppState::in_memory(&config)).await;

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_unknown_route_is_json_404() {
    let app = test_app().await;

    let req = test::TestRequest::get().uri("/no/such/route").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}
