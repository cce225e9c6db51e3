//! Task catalog routes and per-user due lists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{CreateTaskRequest, DueTask, TaskWithIntervals};
use uuid::Uuid;
use validator::Validate;

use super::ListResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::{RepetitionScheduler, TaskCatalogService};

/// Create a learning task (assigned to every member) or a shop task (`cost_coins > 0`).
///
/// POST /api/v1/groups/:group_id/tasks
pub async fn create_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskWithIntervals>), ApiError> {
    request.validate()?;

    let task = TaskCatalogService::new(state.pool.clone())
        .create_task(group_id, user_auth.user_id, &request, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/groups/:group_id/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListResponse<TaskWithIntervals>>, ApiError> {
    let tasks = TaskCatalogService::new(state.pool.clone())
        .list_group_tasks(group_id, user_auth.user_id)
        .await?;
    Ok(Json(tasks.into()))
}

/// Tasks due now for the current user.
///
/// GET /api/v1/groups/:group_id/tasks/today
pub async fn due_today(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListResponse<DueTask>>, ApiError> {
    let tasks = RepetitionScheduler::new(state.pool.clone(), state.config.scheduler)
        .due_tasks(user_auth.user_id, group_id, Utc::now())
        .await?;
    Ok(Json(tasks.into()))
}

/// GET /api/v1/groups/:group_id/tasks/pending
pub async fn pending(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListResponse<DueTask>>, ApiError> {
    let tasks = RepetitionScheduler::new(state.pool.clone(), state.config.scheduler)
        .pending_tasks(user_auth.user_id, group_id)
        .await?;
    Ok(Json(tasks.into()))
}

/// Delete a task definition. Creator only.
///
/// DELETE /api/v1/tasks/:task_id
pub async fn delete_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    TaskCatalogService::new(state.pool.clone())
        .delete_task(task_id, user_auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
