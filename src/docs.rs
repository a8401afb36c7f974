//! OpenAPI document and Swagger UI.
//!
//! [`ApiDoc`] collects every documented route and its schemas. When enabled,
//! the document is served at `/api-docs/openapi.json` and browsable under
//! `/docs/`.

use actix_web::web;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{LoginRequest, LoginResponse, LogoutResponse, RegisterRequest, UserResponse};
use crate::error::ErrorBody;
use crate::models::{Task, TaskInput, TaskList, TaskSummary, TaskUpdate, UserProfile};
use crate::routes::{
    dashboard::DashboardResponse,
    health::{HealthResponse, WelcomeResponse},
};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token from POST /auth/login."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Task management API",
        description = "Account registration, token login and a shared task list."
    ),
    paths(
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::tasks::list_tasks,
        crate::routes::tasks::get_task,
        crate::routes::tasks::create_task,
        crate::routes::tasks::update_task,
        crate::routes::tasks::delete_task,
        crate::routes::dashboard::dashboard,
        crate::routes::health::index,
        crate::routes::health::health,
    ),
    components(schemas(
        ErrorBody,
        RegisterRequest,
        LoginRequest,
        UserProfile,
        UserResponse,
        LoginResponse,
        LogoutResponse,
        Task,
        TaskInput,
        TaskUpdate,
        TaskList,
        TaskSummary,
        DashboardResponse,
        WelcomeResponse,
        HealthResponse,
    )),
    tags(
        (name = "auth", description = "Registration and token login"),
        (name = "tasks", description = "Task CRUD, bearer token required"),
        (name = "dashboard", description = "Per-user landing data"),
        (name = "health", description = "Liveness and welcome endpoints")
    )
)]
pub struct ApiDoc;

/// Mounts Swagger UI and the raw document when `enabled`.
pub fn config(cfg: &mut web::ServiceConfig, enabled: bool) {
    if enabled {
        cfg.service(SwaggerUi::new("/docs/{_:.*}").url(OPENAPI_PATH, ApiDoc::openapi()));
    }
}
