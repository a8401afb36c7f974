//! In-process repositories.
//!
//! Used by the `memory` storage backend and by the test suites. They honour
//! the same contract as the PostgreSQL implementations, including username and
//! email uniqueness.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{
    RepoError, TaskRepository, UserRepository, DUPLICATE_USER, TASK_NOT_FOUND, USER_NOT_FOUND,
};
use crate::models::{NewTask, NewUser, Task, TaskUpdate, User};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> Result<i32, RepoError> {
        self.last_id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepoError::Database("Identifier space exhausted".into()))?;
        Ok(self.last_id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    table: RwLock<Table<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task, RepoError> {
        let mut table = self.table.write().await;
        let id = table.next_id()?;
        let task = task.into_task(id);
        table.rows.insert(id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: i32) -> Result<Task, RepoError> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(TASK_NOT_FOUND.into()))
    }

    async fn list(&self) -> Result<Vec<Task>, RepoError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, id: i32, changes: TaskUpdate) -> Result<Task, RepoError> {
        let mut table = self.table.write().await;
        let task = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(TASK_NOT_FOUND.into()))?;
        task.apply(changes);
        Ok(task.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(TASK_NOT_FOUND.into()))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut table = self.table.write().await;
        let taken = table
            .rows
            .values()
            .any(|existing| existing.username == user.username || existing.email == user.email);
        if taken {
            return Err(RepoError::Duplicate(DUPLICATE_USER.into()));
        }

        let id = table.next_id()?;
        let stored = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn get(&self, id: i32) -> Result<User, RepoError> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(USER_NOT_FOUND.into()))
    }
}
