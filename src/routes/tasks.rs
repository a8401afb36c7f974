use crate::{
    error::{AppError, ErrorBody},
    models::{Task, TaskInput, TaskList, TaskUpdate},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists every task.
///
/// Tasks are global: every authenticated user sees the same collection,
/// ordered by id.
///
/// ## Responses:
/// - `200 OK`: `{"tasks": [Task, ...]}`.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[utoipa::path(
    get,
    path = "/tasks/",
    responses(
        (status = 200, description = "All tasks", body = TaskList),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[get("/")]
pub async fn list_tasks(tasks: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    let tasks = tasks.list().await?;
    Ok(HttpResponse::Ok().json(TaskList { tasks }))
}

/// Retrieves a specific task by its ID.
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task identifier")),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "No task with this id", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[get("/{id:\\d+}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Creates a new task.
///
/// ## Request Body:
/// - `title`: required, not blank, at most 255 characters.
/// - `description` (optional).
///
/// The task starts out incomplete.
#[utoipa::path(
    post,
    path = "/tasks/create",
    request_body = TaskInput,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[post("/create")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let TaskInput { title, description } = task_data.into_inner();
    let task = tasks.create(title, description).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Partially updates a task.
///
/// Only the fields present in the body change; `completed` is accepted as an
/// alias for `is_completed`. An unknown id is a 404 even when the body is invalid.
#[utoipa::path(
    put,
    path = "/tasks/{id}/update",
    params(("id" = i32, Path, description = "Task identifier")),
    request_body = TaskUpdate,
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "No task with this id", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[put("/{id:\\d+}/update")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update(task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `404 Not Found`: No such task, including one deleted earlier.
#[utoipa::path(
    delete,
    path = "/tasks/{id}/delete",
    params(("id" = i32, Path, description = "Task identifier")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "No task with this id", body = ErrorBody)
    ),
    tag = "tasks",
    security(("bearer_auth" = []))
)]
#[delete("/{id:\\d+}/delete")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    tasks.delete(task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
