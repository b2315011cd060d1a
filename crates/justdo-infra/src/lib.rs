//! # JustDo Infrastructure
//!
//! Concrete implementations of the ports defined in `justdo-core`:
//! JWT and Argon2 auth services, plus user/task repositories.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM; without it
//!   only the in-memory repositories are built

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, InMemoryTaskRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{PostgresTaskRepository, PostgresUserRepository, connect};
