//! PostgreSQL repositories.
//!
//! Writes run inside a transaction. If any statement fails the transaction is
//! dropped without commit, which rolls it back.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    translate_sqlx_error, RepoError, TaskRepository, UserRepository, DUPLICATE_USER,
    TASK_NOT_FOUND, USER_NOT_FOUND,
};
use crate::models::{NewTask, NewUser, Task, TaskUpdate, User};

const TASK_COLUMNS: &str = "id, title, description, is_completed";
const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task, RepoError> {
        const ACTION: &str = "creating the task";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))?;

        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, is_completed) VALUES ($1, $2, $3) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| translate_sqlx_error(e, ACTION))?;

        tx.commit()
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))?;
        Ok(created)
    }

    async fn get(&self, id: i32) -> Result<Task, RepoError> {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| translate_sqlx_error(e, "retrieving the task"))?
            .ok_or_else(|| RepoError::NotFound(TASK_NOT_FOUND.into()))
    }

    async fn list(&self) -> Result<Vec<Task>, RepoError> {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks ORDER BY id", TASK_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| translate_sqlx_error(e, "listing tasks"))
    }

    async fn update(&self, id: i32, changes: TaskUpdate) -> Result<Task, RepoError> {
        const ACTION: &str = "updating the task";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))?;

        // NULL parameters keep the current column value.
        let updated = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks \
             SET title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 is_completed = COALESCE($4, is_completed) \
             WHERE id = $1 \
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.is_completed)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| translate_sqlx_error(e, ACTION))?
        .ok_or_else(|| RepoError::NotFound(TASK_NOT_FOUND.into()))?;

        tx.commit()
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        const ACTION: &str = "deleting the task";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(TASK_NOT_FOUND.into()));
        }

        tx.commit()
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        const ACTION: &str = "registering the user";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))?;

        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match translate_sqlx_error(e, ACTION) {
            RepoError::Duplicate(_) => RepoError::Duplicate(DUPLICATE_USER.into()),
            other => other,
        })?;

        tx.commit()
            .await
            .map_err(|e| translate_sqlx_error(e, ACTION))?;
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate_sqlx_error(e, "logging in the user"))
    }

    async fn get(&self, id: i32) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| translate_sqlx_error(e, "retrieving the user by ID"))?
            .ok_or_else(|| RepoError::NotFound(USER_NOT_FOUND.into()))
    }
}
