//! Everything a request handler may need, built once at startup.

use actix_web::web;
use std::sync::Arc;

use crate::auth::TokenManager;
use crate::config::{Config, Profile, StorageBackend};
use crate::db;
use crate::error::AppError;
use crate::rate_limit::RateLimiter;
use crate::repository::{
    InMemoryTaskRepository, InMemoryUserRepository, PgTaskRepository, PgUserRepository,
    TaskRepository, UserRepository,
};
use crate::services::{TaskService, UserService};

/// Static facts about the running deployment.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub name: String,
    pub profile: Profile,
    pub debug: bool,
    pub database_configured: bool,
    pub jwt_secret_configured: bool,
}

/// Services and shared infrastructure handed to every worker.
///
/// Cloning is cheap: every member is reference counted, so all workers share
/// the same repositories, token manager and rate limiter.
#[derive(Clone)]
pub struct AppState {
    pub tasks: web::Data<TaskService>,
    pub users: web::Data<UserService>,
    pub tokens: web::Data<TokenManager>,
    pub info: web::Data<AppInfo>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Selects the storage backend from `config` and wires the services.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let (tasks, users): (Arc<dyn TaskRepository>, Arc<dyn UserRepository>) =
            match config.storage {
                StorageBackend::Postgres => {
                    let url = config.database_url.as_deref().ok_or_else(|| {
                        AppError::InternalServerError("database URL is not configured".into())
                    })?;
                    let pool = db::connect(url, &config.pool).await?;
                    db::migrate(&pool).await?;
                    log::info!(
                        "using PostgreSQL storage (pool {} + {} overflow)",
                        config.pool.size,
                        config.pool.max_overflow
                    );
                    (
                        Arc::new(PgTaskRepository::new(pool.clone())),
                        Arc::new(PgUserRepository::new(pool)),
                    )
                }
                StorageBackend::Memory => {
                    log::warn!("using in-memory storage; data is lost on restart");
                    (
                        Arc::new(InMemoryTaskRepository::new()),
                        Arc::new(InMemoryUserRepository::new()),
                    )
                }
            };

        Ok(Self::with_repositories(config, tasks, users))
    }

    pub fn with_repositories(
        config: &Config,
        task_repo: Arc<dyn TaskRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        let tokens = Arc::new(TokenManager::from_config(config));
        Self {
            tasks: web::Data::new(TaskService::new(task_repo)),
            users: web::Data::new(UserService::new(
                user_repo,
                tokens.clone(),
                config.bcrypt_cost,
            )),
            tokens: web::Data::from(tokens),
            info: web::Data::new(AppInfo {
                name: config.app_name.clone(),
                profile: config.profile,
                debug: config.debug,
                database_configured: config.database_url.is_some(),
                jwt_secret_configured: !config.jwt_secret.is_empty(),
            }),
            limiter: Arc::new(RateLimiter::new(config.rate_limits.clone())),
        }
    }

    /// Fresh in-memory state, used by the test suites.
    pub fn in_memory(config: &Config) -> Self {
        Self::with_repositories(
            config,
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }
}
