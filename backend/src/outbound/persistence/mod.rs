//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the profile and commission repository ports
//! backed by PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Atomic writes**: commission mutations run in one transaction checked
//!   against the stored revision.
//!
//! # Example
//!
//! ```ignore
//! use commission_backend::outbound::persistence::{
//!     DbPool, DieselCommissionRepository, PoolConfig, run_migrations,
//! };
//!
//! let url = "postgres://localhost/commissions";
//! tokio::task::spawn_blocking(move || run_migrations(url)).await??;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let repo = DieselCommissionRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_commission_repository;
mod diesel_profile_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_commission_repository::DieselCommissionRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
