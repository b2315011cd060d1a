//! In-memory repositories - used when no database is configured, and as
//! test doubles. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use justdo_core::domain::{Task, TaskFilter, User};
use justdo_core::error::RepoError;
use justdo_core::ports::{BaseRepository, TaskRepository, UserRepository};

use super::mask_email;

/// In-memory user store keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        // Mirrors the unique index on users.email
        if store.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("users_email_key".to_string()));
        }
        if store.contains_key(&user.id) {
            return Err(RepoError::Constraint("users_pkey".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }
}

/// In-memory task store keyed by id.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    store: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks across all owners.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn find_owned(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).filter(|t| t.user_id == owner).cloned())
    }

    async fn list(&self, owner: Uuid, filter: TaskFilter) -> Result<Vec<Task>, RepoError> {
        let store = self.store.read().await;

        let mut tasks: Vec<Task> = store
            .values()
            .filter(|t| t.user_id == owner && filter.matches(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            a.deadline
                .cmp(&b.deadline)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        Ok(tasks)
    }

    async fn insert(&self, task: Task) -> Result<Task, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&task.id) {
            return Err(RepoError::Constraint("tasks_pkey".to_string()));
        }
        store.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, task: Task) -> Result<Task, RepoError> {
        let mut store = self.store.write().await;
        match store.get_mut(&task.id) {
            Some(existing) if existing.user_id == task.user_id => {
                *existing = task.clone();
                Ok(task)
            }
            _ => Err(RepoError::NotFound),
        }
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        match store.get(&id) {
            Some(task) if task.user_id == owner => {
                store.remove(&id);
                Ok(())
            }
            _ => Err(RepoError::NotFound),
        }
    }
}
