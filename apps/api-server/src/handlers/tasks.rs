//! Task handlers. The owner always comes from the authenticated [`Identity`].

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use uuid::Uuid;

use justdo_core::domain::{Task, TaskDraft, TaskFilter};
use justdo_shared::dto::{
    TaskListQuery, TaskListResponse, TaskRequest, TaskResponse, ToggleResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /v1/tasks[?deadline=YYYY-MM-DD]
pub async fn list(
    identity: Identity,
    state: web::Data<AppState>,
    query: web::Query<TaskListQuery>,
) -> AppResult<HttpResponse> {
    let filter = match query.deadline.as_deref().map(str::trim) {
        None | Some("") => TaskFilter::All,
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(TaskFilter::DueOn)
            .map_err(|_| {
                AppError::BadRequest("deadline must be a date formatted as YYYY-MM-DD".to_string())
            })?,
    };

    list_filtered(identity, &state, filter).await
}

/// GET /v1/tasks/today
pub async fn today(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    list_filtered(identity, &state, TaskFilter::today()).await
}

/// GET /v1/tasks/backlog
pub async fn backlog(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    list_filtered(identity, &state, TaskFilter::backlog()).await
}

/// POST /v1/tasks
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<TaskRequest>,
) -> AppResult<HttpResponse> {
    let task = state
        .tasks
        .create(identity.user_id, draft(body.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(task_response(task)))
}

/// PUT /v1/tasks/{id}
pub async fn replace(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<TaskRequest>,
) -> AppResult<HttpResponse> {
    let id = task_id(&path)?;
    let task = state
        .tasks
        .replace(identity.user_id, id, draft(body.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(task_response(task)))
}

/// PATCH /v1/tasks/{id}/toggle
pub async fn toggle(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = task_id(&path)?;
    let task = state.tasks.toggle(identity.user_id, id).await?;
    Ok(HttpResponse::Ok().json(ToggleResponse {
        id: task.id,
        completed: task.completed,
    }))
}

/// DELETE /v1/tasks/{id}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = task_id(&path)?;
    state.tasks.delete(identity.user_id, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn list_filtered(
    identity: Identity,
    state: &AppState,
    filter: TaskFilter,
) -> AppResult<HttpResponse> {
    let tasks = state.tasks.list(identity.user_id, filter).await?;
    Ok(HttpResponse::Ok().json(TaskListResponse {
        tasks: tasks.into_iter().map(task_response).collect(),
    }))
}

/// A malformed id can never name an owned task, so it is reported the same way.
fn task_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("task not found".to_string()))
}

fn draft(req: TaskRequest) -> TaskDraft {
    TaskDraft {
        title: req.title,
        description: req.description,
        deadline: req.deadline,
    }
}

fn task_response(task: Task) -> TaskResponse {
    TaskResponse {
        id: task.id,
        title: task.title,
        description: task.description,
        deadline: task.deadline,
        completed: task.completed,
        created_at: task.created_at,
        updated_at: task.updated_at,
    }
}
