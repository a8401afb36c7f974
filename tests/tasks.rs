mod common;

use std::time::Duration;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskdeck::{models::Task, rate_limit::RateLimitRule, AppState, Config};

use common::{bearer, init_app, test_app, token_for};

#[test_log::test(actix_rt::test)]
async fn test_task_crud_flow() {
    let app = test_app().await;
    let token = token_for(&app, "worker").await;

    // Create
    let req = test::TestRequest::post()
        .uri("/tasks/create")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Buy milk", "description": "2 litres" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.description.as_deref(), Some("2 litres"));
    assert!(!created.is_completed);

    // Read
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", created.id))
        .insert_header(bearer(&token))
        .to_request();
    let fetched: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    // Partial update leaves title and description alone
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}/update", created.id))
        .insert_header(bearer(&token))
        .set_json(json!({ "is_completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = test::read_body_json(resp).await;
    assert_eq!(
        updated,
        Task {
            is_completed: true,
            ..created.clone()
        }
    );

    // `completed` is accepted too
    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}/update", created.id))
        .insert_header(bearer(&token))
        .set_json(json!({ "completed": false, "title": "Buy oat milk" }))
        .to_request();
    let updated: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.title, "Buy oat milk");
    assert!(!updated.is_completed);

    // Delete, then delete again
    let delete = || {
        test::TestRequest::delete()
            .uri(&format!("/tasks/{}/delete", created.id))
            .insert_header(bearer(&token))
            .to_request()
    };
    let resp = test::call_service(&app, delete()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, delete()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}", created.id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_create_task_requires_title() {
    let app = test_app().await;
    let token = token_for(&app, "worker").await;

    for payload in [
        json!({ "title": "" }),
        json!({ "title": "   " }),
        json!({ "description": "no title at all" }),
        json!({ "title": "x".repeat(256) }),
    ] {
        let req = test::TestRequest::post()
            .uri("/tasks/create")
            .insert_header(bearer(&token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{payload}");
    }

    let req = test::TestRequest::get()
        .uri("/tasks/")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "tasks": [] }));
}

#[actix_rt::test]
async fn test_update_rejects_blank_title_and_unknown_id() {
    let app = test_app().await;
    let token = token_for(&app, "worker").await;

    let req = test::TestRequest::post()
        .uri("/tasks/create")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Keep me" }))
        .to_request();
    let created: Task = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/tasks/{}/update", created.id))
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/tasks/9999/update")
        .insert_header(bearer(&token))
        .set_json(json!({ "is_completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri("/tasks/9999/update")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}

#[actix_rt::test]
async fn test_list_returns_every_task_in_id_order() {
    let app = test_app().await;
    let token = token_for(&app, "worker").await;

    for i in 1..=3 {
        let req = test::TestRequest::post()
            .uri("/tasks/create")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": format!("Task {i}") }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Tasks are shared: another user sees the same list.
    let other = token_for(&app, "observer").await;
    let req = test::TestRequest::get()
        .uri("/tasks/")
        .insert_header(bearer(&other))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Task 1", "Task 2", "Task 3"]);
}

#[actix_rt::test]
async fn test_dashboard_summarises_tasks() {
    let app = test_app().await;
    let token = token_for(&app, "worker").await;

    for (title, done) in [("a", true), ("b", false), ("c", true)] {
        let req = test::TestRequest::post()
            .uri("/tasks/create")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": title }))
            .to_request();
        let task: Task = test::call_and_read_body_json(&app, req).await;
        if done {
            let req = test::TestRequest::put()
                .uri(&format!("/tasks/{}/update", task.id))
                .insert_header(bearer(&token))
                .set_json(json!({ "is_completed": true }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
    }

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Welcome to the Task Management System!");
    assert_eq!(body["user_id"], 1);
    assert_eq!(
        body["summary"],
        json!({ "total": 3, "completed": 2, "pending": 1 })
    );

    let req = test::TestRequest::get().uri("/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    let mut config = Config::testing();
    config.rate_limits = vec![RateLimitRule::new(2, Duration::from_secs(60))];
    let app = init_app(AppState::in_memory(&config)).await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .expect("Retry-After header");
    assert!((1..=60).contains(&retry_after));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "rate_limited");
}

// Full server on an ephemeral port, exercised over real HTTP.
#[actix_rt::test]
async fn test_live_server_rejects_anonymous_task_access() {
    use actix_web::{App, HttpServer};

    let state = AppState::in_memory(&Config::testing());
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new().configure(|cfg| taskdeck::routes::config(cfg, &state))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind ephemeral port");
    let addr = server.addrs()[0];
    let handle = server.run();
    let server_handle = handle.handle();
    actix_rt::spawn(handle);

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{addr}/tasks/"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status().as_u16(), 401);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], "token_missing");

    let resp = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status().as_u16(), 200);

    server_handle.stop(true).await;
}
