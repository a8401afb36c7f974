use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct TaskInput {
    /// The title of the task. Required; must not be blank.
    #[serde(default)]
    #[validate(length(max = 255))]
    pub title: String,

    /// An optional description for the task.
    #[validate(length(max = 10000))]
    pub description: Option<String>,
}

/// Input structure for a partial task update.
///
/// Fields left out of the request (or sent as `null`) keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TaskUpdate {
    /// New title, must not be blank when present.
    #[validate(length(max = 255))]
    pub title: Option<String>,

    /// New description.
    #[validate(length(max = 10000))]
    pub description: Option<String>,

    /// New completion flag. `completed` is accepted as well.
    #[serde(alias = "completed")]
    pub is_completed: Option<bool>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.is_completed.is_none()
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Task {
    /// Unique identifier, generated by storage.
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Completion status, `false` for new tasks.
    pub is_completed: bool,
}

impl Task {
    pub fn mark_complete(&mut self) {
        self.is_completed = true;
    }

    pub fn mark_incomplete(&mut self) {
        self.is_completed = false;
    }

    /// Applies every field present in `changes`, leaving the rest untouched.
    pub fn apply(&mut self, changes: TaskUpdate) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        match changes.is_completed {
            Some(true) => self.mark_complete(),
            Some(false) => self.mark_incomplete(),
            None => {}
        }
    }
}

/// A task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
            is_completed: false,
        }
    }

    pub fn into_task(self, id: i32) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            is_completed: self.is_completed,
        }
    }
}

/// Task counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.is_completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
        }
    }
}

/// Body of `GET /tasks/`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}
