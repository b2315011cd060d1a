//! Task use cases. Every operation is scoped to the authenticated owner.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Task, TaskDraft, TaskFilter};
use crate::error::{DomainError, RepoError};
use crate::ports::TaskRepository;

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn list(&self, owner: Uuid, filter: TaskFilter) -> Result<Vec<Task>, DomainError> {
        Ok(self.tasks.list(owner, filter).await?)
    }

    pub async fn create(&self, owner: Uuid, draft: TaskDraft) -> Result<Task, DomainError> {
        let task = Task::new(owner, draft)?;
        let task = self.tasks.insert(task).await?;
        tracing::debug!(task_id = %task.id, user_id = %owner, "task created");
        Ok(task)
    }

    /// Replace title, description and deadline of an owned task.
    pub async fn replace(
        &self,
        owner: Uuid,
        id: Uuid,
        draft: TaskDraft,
    ) -> Result<Task, DomainError> {
        let mut task = self.owned(owner, id).await?;
        task.apply(draft)?;
        self.tasks.update(task).await.map_err(not_found_as_task)
    }

    pub async fn toggle(&self, owner: Uuid, id: Uuid) -> Result<Task, DomainError> {
        let mut task = self.owned(owner, id).await?;
        task.toggle();
        self.tasks.update(task).await.map_err(not_found_as_task)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        self.tasks
            .delete_owned(owner, id)
            .await
            .map_err(not_found_as_task)?;
        tracing::debug!(task_id = %id, user_id = %owner, "task deleted");
        Ok(())
    }

    async fn owned(&self, owner: Uuid, id: Uuid) -> Result<Task, DomainError> {
        self.tasks
            .find_owned(owner, id)
            .await?
            .ok_or(DomainError::NotFound("task"))
    }
}

fn not_found_as_task(err: RepoError) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::NotFound("task"),
        other => other.into(),
    }
}
