use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::rate_limit::RateLimitRule;

const DEFAULT_APP_NAME: &str = "Task Management System";
const DEFAULT_RATE_LIMIT: &str = "5000 per day;1000 per hour;100 per minute";
const TESTING_JWT_SECRET: &str = "testing-secret-do-not-use-in-production";

/// Deployment profile selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Testing,
    Production,
}

impl Profile {
    /// The environment variable holding this profile's database URI.
    pub fn database_key(&self) -> &'static str {
        match self {
            Profile::Development => "DEV_DB",
            Profile::Testing => "TESTING_DB",
            Profile::Production => "PROD_DB",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Testing => "testing",
            Profile::Production => "production",
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "testing" | "test" => Ok(Profile::Testing),
            "production" | "prod" => Ok(Profile::Production),
            other => Err(format!("unknown profile '{}'", other)),
        }
    }
}

/// Which repository implementation the application runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Connection pool sizing.
///
/// The pool keeps `size` connections and may open up to `max_overflow` more
/// under load. Waiting for a connection longer than `timeout` fails the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub size: u32,
    pub max_overflow: u32,
    pub recycle: Duration,
    pub timeout: Duration,
}

impl PoolConfig {
    pub fn max_connections(&self) -> u32 {
        self.size.saturating_add(self.max_overflow)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 5,
            max_overflow: 10,
            recycle: Duration::from_secs(1800),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(String),
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "{} has invalid value '{}': {}", key, value, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub profile: Profile,
    pub app_name: String,
    pub debug: bool,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub pool: PoolConfig,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub token_revoked_before: Option<i64>,
    pub bcrypt_cost: u32,
    pub rate_limits: Vec<RateLimitRule>,
    pub api_docs: bool,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(values: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| values.get(key).map(|v| v.to_string()))
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let profile: Profile = parse_or(&get, "APP_ENV", Profile::Development)?;
        let testing = profile == Profile::Testing;

        let database_url = get(profile.database_key()).or_else(|| get("DATABASE_URL"));
        let default_storage = if testing {
            StorageBackend::Memory
        } else {
            StorageBackend::Postgres
        };
        let storage = parse_or(&get, "STORAGE_BACKEND", default_storage)?;
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing(format!(
                "{} or DATABASE_URL",
                profile.database_key()
            )));
        }

        let jwt_secret = match get("JWT_SECRET_KEY").or_else(|| get("JWT_SECRET")) {
            Some(secret) => secret,
            None if testing => TESTING_JWT_SECRET.to_string(),
            None => return Err(ConfigError::Missing("JWT_SECRET_KEY".into())),
        };

        let defaults = PoolConfig::default();
        let pool = PoolConfig {
            size: parse_or(&get, "DB_POOL_SIZE", defaults.size)?,
            max_overflow: parse_or(&get, "DB_MAX_OVERFLOW", defaults.max_overflow)?,
            recycle: Duration::from_secs(parse_or(
                &get,
                "DB_POOL_RECYCLE",
                defaults.recycle.as_secs(),
            )?),
            timeout: Duration::from_secs(parse_or(
                &get,
                "DB_POOL_TIMEOUT",
                defaults.timeout.as_secs(),
            )?),
        };
        if pool.size == 0 {
            return Err(invalid("DB_POOL_SIZE", "0", "pool size must be at least 1"));
        }
        if pool.size.checked_add(pool.max_overflow).is_none() {
            return Err(invalid(
                "DB_MAX_OVERFLOW",
                &pool.max_overflow.to_string(),
                "pool size plus overflow does not fit in a u32",
            ));
        }

        let ttl_seconds: i64 = parse_or(&get, "JWT_ACCESS_TOKEN_EXPIRES", 3600)?;
        if ttl_seconds <= 0 {
            return Err(invalid(
                "JWT_ACCESS_TOKEN_EXPIRES",
                &ttl_seconds.to_string(),
                "token lifetime must be positive",
            ));
        }
        let token_ttl = chrono::Duration::try_seconds(ttl_seconds).ok_or_else(|| {
            invalid(
                "JWT_ACCESS_TOKEN_EXPIRES",
                &ttl_seconds.to_string(),
                "token lifetime is out of range",
            )
        })?;

        let token_revoked_before = match get("JWT_REVOKED_BEFORE") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|e| invalid("JWT_REVOKED_BEFORE", &raw, &e.to_string()))?,
            ),
            None => None,
        };

        let bcrypt_cost: u32 = parse_or(&get, "BCRYPT_COST", if testing { 4 } else { 12 })?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(invalid(
                "BCRYPT_COST",
                &bcrypt_cost.to_string(),
                "cost must be between 4 and 31",
            ));
        }

        let rate_limits = if parse_bool_or(&get, "RATE_LIMIT_ENABLED", true)? {
            let raw = get("RATE_LIMIT").unwrap_or_else(|| DEFAULT_RATE_LIMIT.to_string());
            RateLimitRule::parse_list(&raw).map_err(|e| invalid("RATE_LIMIT", &raw, &e))?
        } else {
            Vec::new()
        };

        Ok(Self {
            profile,
            app_name: get("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            debug: parse_bool_or(&get, "DEBUG", false)?,
            storage,
            database_url,
            pool,
            jwt_secret,
            token_ttl,
            token_revoked_before,
            bcrypt_cost,
            rate_limits,
            api_docs: parse_bool_or(&get, "API_DOCS", true)?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or(&get, "SERVER_PORT", 8080)?,
        })
    }

    /// Configuration for tests: in-memory storage, cheap hashing, no request quota.
    pub fn testing() -> Self {
        Self {
            profile: Profile::Testing,
            app_name: DEFAULT_APP_NAME.to_string(),
            debug: false,
            storage: StorageBackend::Memory,
            database_url: None,
            pool: PoolConfig::default(),
            jwt_secret: TESTING_JWT_SECRET.to_string(),
            token_ttl: chrono::Duration::hours(1),
            token_revoked_before: None,
            bcrypt_cost: 4,
            rate_limits: Vec::new(),
            api_docs: false,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(key, &raw, "expected a boolean")),
        },
        None => Ok(default),
    }
}
