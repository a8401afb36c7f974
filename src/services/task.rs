use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskSummary, TaskUpdate};
use crate::repository::TaskRepository;
use validator::Validate;

/// Task use cases. Holds no state beyond its repository.
#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

fn require_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::ValidationError("Title must not be empty".into()));
    }
    Ok(())
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, title: String, description: Option<String>) -> Result<Task, AppError> {
        require_title(&title)?;
        let task = self.repo.create(NewTask::new(title, description)).await?;
        log::info!("created task {}", task.id);
        Ok(task)
    }

    pub async fn get(&self, id: i32) -> Result<Task, AppError> {
        Ok(self.repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.repo.list().await?)
    }

    /// A missing task is reported before any problem with `changes`.
    pub async fn update(&self, id: i32, changes: TaskUpdate) -> Result<Task, AppError> {
        self.repo.get(id).await?;
        changes.validate()?;
        if let Some(title) = &changes.title {
            require_title(title)?;
        }
        Ok(self.repo.update(id, changes).await?)
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        self.repo.delete(id).await?;
        log::info!("deleted task {}", id);
        Ok(())
    }

    pub async fn summary(&self) -> Result<TaskSummary, AppError> {
        let tasks = self.repo.list().await?;
        Ok(TaskSummary::from_tasks(&tasks))
    }
}
