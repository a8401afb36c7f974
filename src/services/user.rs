use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::auth::{hash_password, verify_password, TokenManager};
use crate::error::AppError;
use crate::models::{NewUser, UserProfile};
use crate::repository::{RepoError, UserRepository};

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub user_id: i32,
    pub expires_in: i64,
}

/// Registration, login and profile lookup.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<TokenManager>,
    bcrypt_cost: u32,
    /// Hash at `bcrypt_cost` checked against when the username is unknown,
    /// so both login failures cost one bcrypt verification.
    dummy_hash: Arc<OnceCell<String>>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: Arc<TokenManager>, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            tokens,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    async fn dummy_hash(&self) -> Result<String, AppError> {
        self.dummy_hash
            .get_or_try_init(|| hash_password("not-a-real-password".into(), self.bcrypt_cost))
            .await
            .cloned()
    }

    pub async fn register(
        &self,
        username: String,
        password: String,
        email: String,
    ) -> Result<UserProfile, AppError> {
        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let user = self
            .repo
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;
        log::info!("registered user {} ({})", user.id, user.username);
        Ok(UserProfile::from(&user))
    }

    /// Unknown usernames and wrong passwords both end in `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: String) -> Result<IssuedToken, AppError> {
        let user = match self.repo.find_by_username(username).await {
            Ok(Some(user)) => user,
            Ok(None) | Err(RepoError::NotFound(_)) => {
                let dummy = self.dummy_hash().await?;
                verify_password(password, dummy).await?;
                log::warn!("failed login for unknown user");
                return Err(AppError::InvalidCredentials);
            }
            Err(other) => return Err(other.into()),
        };

        if !verify_password(password, user.password_hash.clone()).await? {
            log::warn!("failed login for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(user.id)?;
        log::info!("user {} logged in", user.id);
        Ok(IssuedToken {
            access_token,
            user_id: user.id,
            expires_in: self.tokens.ttl_seconds(),
        })
    }

    pub async fn profile(&self, user_id: i32) -> Result<UserProfile, AppError> {
        let user = self.repo.get(user_id).await?;
        Ok(UserProfile::from(&user))
    }

    /// Tokens are not tracked server-side, so there is nothing to invalidate.
    pub fn logout(&self) -> &'static str {
        "Logout successful"
    }
}
