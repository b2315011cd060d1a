//! Registration and login flows.

use std::sync::Arc;

use crate::domain::{User, is_valid_email, normalize_email};
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthError, PasswordService, TokenService, UserRepository};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Same message for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Hashed once at construction; unknown-email logins verify against it so
/// both failure paths pay the same hashing cost.
const DUMMY_PASSWORD: &str = "justdo-timing-equalizer";

/// Email/password pair submitted by a client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A freshly issued token together with the user it identifies.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    dummy_hash: Option<Arc<str>>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        let dummy_hash = match passwords.hash(DUMMY_PASSWORD) {
            Ok(hash) => Some(Arc::from(hash)),
            Err(e) => {
                tracing::warn!(error = %e, "could not prepare dummy password hash");
                None
            }
        };

        Self {
            users,
            tokens,
            passwords,
            dummy_hash,
        }
    }

    pub fn tokens(&self) -> Arc<dyn TokenService> {
        self.tokens.clone()
    }

    #[tracing::instrument(skip_all)]
    pub async fn register(&self, credentials: Credentials) -> Result<AuthOutcome, DomainError> {
        let email = normalize_email(&credentials.email);
        if !is_valid_email(&email) {
            return Err(DomainError::Validation("invalid email address".to_string()));
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            tracing::warn!("registration rejected: email already registered");
            return Err(DomainError::Duplicate("email already registered".to_string()));
        }

        let password_hash = self.passwords.hash(&credentials.password).map_err(internal)?;

        let user = match self.users.insert(User::new(email, password_hash)).await {
            Ok(user) => user,
            // Lost a race with a concurrent registration of the same email.
            Err(RepoError::Constraint(_)) => {
                return Err(DomainError::Duplicate("email already registered".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.tokens.issue(user.id).map_err(internal)?;
        tracing::info!(user_id = %user.id, "user registered");

        Ok(AuthOutcome { token, user })
    }

    #[tracing::instrument(skip_all)]
    pub async fn login(&self, credentials: Credentials) -> Result<AuthOutcome, DomainError> {
        let email = normalize_email(&credentials.email);
        if !is_valid_email(&email) {
            return Err(DomainError::Validation("invalid email address".to_string()));
        }
        if credentials.password.is_empty() {
            return Err(DomainError::Validation("password is required".to_string()));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            if let Some(hash) = &self.dummy_hash {
                let _ = self.passwords.verify(&credentials.password, hash);
            }
            tracing::warn!("login failed: unknown email");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let valid = self
            .passwords
            .verify(&credentials.password, &user.password_hash)
            .map_err(internal)?;
        if !valid {
            tracing::warn!(user_id = %user.id, "login failed: wrong password");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue(user.id).map_err(internal)?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(AuthOutcome { token, user })
    }
}

fn internal(err: AuthError) -> DomainError {
    DomainError::Internal(err.to_string())
}
