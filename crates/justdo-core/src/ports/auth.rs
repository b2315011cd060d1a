//! Authentication ports.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Verified contents of an identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies signed, time-bounded identity tokens.
///
/// Verification is stateless: nothing about issued tokens is persisted.
pub trait TokenService: Send + Sync {
    /// Sign a token for `user_id` that expires a fixed duration from now.
    fn issue(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Check signature, structure and expiry, returning the embedded identity.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Signing key unavailable")]
    MissingSigningKey,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
