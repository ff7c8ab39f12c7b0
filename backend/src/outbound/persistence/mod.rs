//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Provides the durable [`AccountRepository`](crate::domain::ports::AccountRepository)
//! implementation backed by PostgreSQL through `diesel-async` with `bb8`
//! connection pooling, plus the embedded schema migrations.
//!
//! Diesel row structs (`models.rs`) and table definitions (`schema.rs`) are
//! internal and never exposed to the domain.
//!
//! # Example
//!
//! ```ignore
//! use accounts::outbound::persistence::{DbPool, DieselAccountRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/accounts")).await?;
//! let repository = DieselAccountRepository::new(pool);
//! ```

mod diesel_account_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_SIZE, DEFAULT_MIN_IDLE, DbPool, PoolConfig, PoolError,
};
