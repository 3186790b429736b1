//! Database layer
//!
//! SQLite is the default backend. MySQL and PostgreSQL are available for
//! hosted deployments. The driver is picked from [`crate::config::DatabaseConfig`].
//!
//! ```ignore
//! use postnest::config::DatabaseConfig;
//! use postnest::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repositories;

pub use error::{is_unique_violation, RepositoryError};
pub use pool::{
    create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool, MysqlDatabase,
    PostgresDatabase, SqliteDatabase,
};
