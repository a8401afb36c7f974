use crate::state::AppInfo;
use actix_web::{get, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub app: String,
    pub profile: String,
    pub timestamp: DateTime<Utc>,
    pub database_configured: bool,
    pub jwt_secret_configured: bool,
}

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message", body = WelcomeResponse)),
    tag = "health"
)]
#[get("/")]
pub async fn index(info: web::Data<AppInfo>) -> impl Responder {
    HttpResponse::Ok().json(WelcomeResponse {
        message: format!("Welcome to the {} API", info.name),
    })
}

/// Health check endpoint
///
/// Returns the current status of the API and timestamp. Secrets are never
/// echoed, only whether they are set.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
#[get("/health")]
pub async fn health(info: web::Data<AppInfo>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        app: info.name.clone(),
        profile: info.profile.as_str().to_string(),
        timestamp: Utc::now(),
        database_configured: info.database_configured,
        jwt_secret_configured: info.jwt_secret_configured,
    })
}
