#![doc = "The `taskdeck` library crate."]
#![doc = ""]
#![doc = "Domain models, storage, authentication, routing and error handling for the"]
#![doc = "task management API. The `taskdeck` binary builds an `HttpServer` from these"]
#![doc = "pieces; the `migrate` binary only applies the database schema."]

pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
