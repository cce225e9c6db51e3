//! Assignment routes: completion, progress and history.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use domain::models::{CompleteTaskResponse, TaskHistoryEntry, TaskStats, UserTaskDetails};
use uuid::Uuid;

use super::ListResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::RepetitionScheduler;

fn scheduler(state: &AppState) -> RepetitionScheduler {
    RepetitionScheduler::new(state.pool.clone(), state.config.scheduler)
}

/// GET /api/v1/user-tasks/:user_task_id
pub async fn get_user_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(user_task_id): Path<Uuid>,
) -> Result<Json<UserTaskDetails>, ApiError> {
    let details = scheduler(&state)
        .user_task_details(user_task_id, user_auth.user_id)
        .await?;
    Ok(Json(details))
}

/// Complete the current repetition and earn the reward.
///
/// POST /api/v1/user-tasks/:user_task_id/complete
pub async fn complete(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(user_task_id): Path<Uuid>,
) -> Result<Json<CompleteTaskResponse>, ApiError> {
    let response = scheduler(&state)
        .complete(user_task_id, user_auth.user_id, Utc::now())
        .await?;
    Ok(Json(response))
}

/// GET /api/v1/user-tasks/:user_task_id/stats
pub async fn stats(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(user_task_id): Path<Uuid>,
) -> Result<Json<TaskStats>, ApiError> {
    let stats = scheduler(&state)
        .task_stats(user_task_id, user_auth.user_id)
        .await?;
    Ok(Json(stats))
}

/// GET /api/v1/user-tasks/:user_task_id/history
pub async fn history(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(user_task_id): Path<Uuid>,
) -> Result<Json<ListResponse<TaskHistoryEntry>>, ApiError> {
    let entries = scheduler(&state)
        .history(user_task_id, user_auth.user_id)
        .await?;
    Ok(Json(entries.into()))
}
