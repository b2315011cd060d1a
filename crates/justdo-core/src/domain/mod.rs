//! Domain entities - the core business objects.

mod task;
mod user;

pub use task::{Task, TaskDraft, TaskFilter, MAX_TITLE_LEN};
pub use user::{User, is_valid_email, normalize_email};
