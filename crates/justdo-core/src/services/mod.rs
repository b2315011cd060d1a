//! Use cases - orchestrate ports on behalf of the HTTP layer.

mod auth;
mod tasks;

pub use auth::{AuthOutcome, AuthService, Credentials, MIN_PASSWORD_LEN};
pub use tasks::TaskService;
