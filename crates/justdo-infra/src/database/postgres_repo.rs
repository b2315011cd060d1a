//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use justdo_core::domain::{Task, TaskFilter, User};
use justdo_core::error::RepoError;
use justdo_core::ports::{BaseRepository, TaskRepository, UserRepository};

use super::entity::task::{self, Entity as TaskEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::mask_email;
use super::postgres_base::{PostgresBaseRepository, read_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL task repository.
pub type PostgresTaskRepository = PostgresBaseRepository<TaskEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(read_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn find_owned(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, RepoError> {
        let result = TaskEntity::find_by_id(id)
            .filter(task::Column::UserId.eq(owner))
            .one(self.db.as_ref())
            .await
            .map_err(read_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, owner: Uuid, filter: TaskFilter) -> Result<Vec<Task>, RepoError> {
        let mut query = TaskEntity::find().filter(task::Column::UserId.eq(owner));

        query = match filter {
            TaskFilter::All => query,
            TaskFilter::DueOn(date) => {
                let (start, end) = TaskFilter::day_bounds(date);
                query
                    .filter(task::Column::Deadline.gte(start))
                    .filter(task::Column::Deadline.lt(end))
            }
            TaskFilter::Backlog { now } => query
                .filter(task::Column::Completed.eq(false))
                .filter(task::Column::Deadline.lt(now)),
        };

        let rows = query
            .order_by_asc(task::Column::Deadline)
            .order_by_asc(task::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(read_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, task: Task) -> Result<Task, RepoError> {
        <Self as BaseRepository<Task, Uuid>>::insert(self, task).await
    }

    async fn update(&self, task: Task) -> Result<Task, RepoError> {
        let owner = task.user_id;
        let active_model: task::ActiveModel = task.into();

        let model = TaskEntity::update(active_model)
            .filter(task::Column::UserId.eq(owner))
            .exec(self.db.as_ref())
            .await
            .map_err(write_error)?;

        Ok(model.into())
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> Result<(), RepoError> {
        let result = TaskEntity::delete_many()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::UserId.eq(owner))
            .exec(self.db.as_ref())
            .await
            .map_err(read_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
