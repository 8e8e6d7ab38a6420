//! Database module for GadgetVault
//!
//! Connectivity, models and repositories for persistent storage using
//! PostgreSQL and SQLx.

pub mod models;
pub mod pool;
pub mod repositories;

pub use models::*;
pub use pool::{DbConfig, DbError, create_pool_with_migrations, health_check};
pub use repositories::{GadgetRepository, GadgetRepositoryError, UserRepository, UserRepositoryError};

pub use sqlx::PgPool;
