use crate::{
    auth::{AuthMiddleware, AuthenticatedUserId},
    error::{AppError, ErrorBody},
    models::TaskSummary,
    services::TaskService,
    state::AppInfo,
};
use actix_web::{get, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub message: String,
    /// Id of the user the token was issued to.
    pub user_id: i32,
    pub summary: TaskSummary,
}

/// Dashboard
///
/// Greets the authenticated user and summarises the task collection.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tag = "dashboard",
    security(("bearer_auth" = []))
)]
#[get("/dashboard", wrap = "AuthMiddleware")]
pub async fn dashboard(
    info: web::Data<AppInfo>,
    tasks: web::Data<TaskService>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let summary = tasks.summary().await?;
    Ok(HttpResponse::Ok().json(DashboardResponse {
        message: format!("Welcome to the {}!", info.name),
        user_id: user_id.0,
        summary,
    }))
}
