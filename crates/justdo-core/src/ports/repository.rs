use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Task, TaskFilter, User};
use crate::error::RepoError;

/// Generic repository trait for entities addressed by a primary key alone.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Task repository.
///
/// Every method is scoped to an owner: a task belonging to someone else
/// behaves exactly like a task that does not exist.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_owned(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, RepoError>;

    /// Owner's tasks matching `filter`, ordered by deadline then creation time.
    async fn list(&self, owner: Uuid, filter: TaskFilter) -> Result<Vec<Task>, RepoError>;

    async fn insert(&self, task: Task) -> Result<Task, RepoError>;

    /// Overwrite the row matching `(task.id, task.user_id)`.
    /// Returns `RepoError::NotFound` when no such row exists.
    async fn update(&self, task: Task) -> Result<Task, RepoError>;

    /// Returns `RepoError::NotFound` when no row matched.
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> Result<(), RepoError>;
}
