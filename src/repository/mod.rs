//! Storage ports.
//!
//! Every operation on these traits either succeeds or fails with exactly one
//! [`RepoError`] kind. Raw storage errors are logged and translated inside the
//! implementation; callers never see them.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;

use crate::models::{NewTask, NewUser, Task, TaskUpdate, User};

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

pub(crate) const TASK_NOT_FOUND: &str = "Task not found";
pub(crate) const USER_NOT_FOUND: &str = "User not found";
pub(crate) const DUPLICATE_USER: &str = "Username or email already exists";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    Duplicate(String),
    /// Any other storage failure, with a message safe to show clients.
    Database(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RepoError::NotFound(msg) => write!(f, "not found: {}", msg),
            RepoError::Duplicate(msg) => write!(f, "duplicate: {}", msg),
            RepoError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl std::error::Error for RepoError {}

/// Translates a sqlx failure into a [`RepoError`].
///
/// `action` completes the sentence "An error occurred while ..." used for
/// database errors.
pub(crate) fn translate_sqlx_error(error: sqlx::Error, action: &str) -> RepoError {
    match &error {
        sqlx::Error::RowNotFound => RepoError::NotFound("Record not found".into()),
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            log::debug!("unique violation while {}: {}", action, db_error);
            RepoError::Duplicate("Record already exists".into())
        }
        _ => {
            log::error!("database failure while {}: {}", action, error);
            RepoError::Database(format!("An error occurred while {}", action))
        }
    }
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: NewTask) -> Result<Task, RepoError>;

    async fn get(&self, id: i32) -> Result<Task, RepoError>;

    /// All tasks, ordered by id.
    async fn list(&self) -> Result<Vec<Task>, RepoError>;

    /// Applies the fields present in `changes` and returns the stored result.
    async fn update(&self, id: i32, changes: TaskUpdate) -> Result<Task, RepoError>;

    async fn delete(&self, id: i32) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user; a taken username or email is a `Duplicate`.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn get(&self, id: i32) -> Result<User, RepoError>;
}
