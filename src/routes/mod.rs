pub mod auth;
pub mod dashboard;
pub mod health;
pub mod tasks;

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::state::AppState;

/// Registers shared state, extractor error handlers and every route.
pub fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.tasks.clone())
        .app_data(state.users.clone())
        .app_data(state.tokens.clone())
        .app_data(state.info.clone())
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::logout)
                .service(auth::me),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(dashboard::dashboard)
        .service(health::health)
        .service(health::index)
        .default_service(web::to(not_found));
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::NotFound(format!("Invalid path parameter: {}", err)).into()
}

async fn not_found(req: HttpRequest) -> HttpResponse {
    log::debug!("no route for {} {}", req.method(), req.path());
    error::ResponseError::error_response(&AppError::NotFound(
        "The requested URL was not found on the server".into(),
    ))
}
