//! Application state - shared across all handlers.

use std::sync::Arc;

use justdo_core::ports::{PasswordService, TaskRepository, TokenService, UserRepository};
use justdo_core::services::{AuthService, TaskService};
use justdo_infra::{
    Argon2PasswordService, InMemoryTaskRepository, InMemoryUserRepository, JwtTokenService,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub tasks: TaskService,
}

impl AppState {
    /// Wire services over the given adapters.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            auth: AuthService::new(users, tokens, passwords),
            tasks: TaskService::new(tasks),
        }
    }

    /// State backed by fresh in-memory repositories.
    pub fn in_memory(tokens: Arc<dyn TokenService>, passwords: Arc<dyn PasswordService>) -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTaskRepository::new()),
            tokens,
            passwords,
        )
    }

    /// Token verifier used by the auth middleware.
    pub fn tokens(&self) -> Arc<dyn TokenService> {
        self.auth.tokens()
    }

    /// Build the application state with appropriate implementations.
    ///
    /// Connects to Postgres and applies pending migrations when a database is
    /// configured; otherwise falls back to in-memory repositories.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            use anyhow::Context;
            use justdo_infra::{PostgresTaskRepository, PostgresUserRepository};
            use migration::{Migrator, MigratorTrait};

            let conn = justdo_infra::connect(db_config)
                .await
                .context("failed to connect to database")?;

            if config.reset_database {
                tracing::warn!("DB_RESET set: dropping and re-creating schema");
                Migrator::fresh(&conn)
                    .await
                    .context("failed to reset database schema")?;
            } else {
                Migrator::up(&conn, None)
                    .await
                    .context("failed to apply migrations")?;
            }
            tracing::info!("Database schema up to date");

            let conn = Arc::new(conn);
            let state = Self::new(
                Arc::new(PostgresUserRepository::new(conn.clone())),
                Arc::new(PostgresTaskRepository::new(conn)),
                tokens,
                passwords,
            );
            tracing::info!("Application state initialized (postgres)");
            return Ok(state);
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }

        tracing::warn!("No database configured. Running in-memory; data is lost on restart.");
        Ok(Self::in_memory(tokens, passwords))
    }
}
