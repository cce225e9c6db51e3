//! Marketplace routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{BuyTaskRequest, BuyTaskResponse, ShopTask};
use uuid::Uuid;

use super::ListResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::{MarketplaceService, TaskCatalogService};

/// Shop tasks of the group with `can_afford` for the caller.
///
/// GET /api/v1/groups/:group_id/shop
pub async fn list_shop(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListResponse<ShopTask>>, ApiError> {
    let tasks = TaskCatalogService::new(state.pool.clone())
        .list_shop_tasks(group_id, user_auth.user_id)
        .await?;
    Ok(Json(tasks.into()))
}

/// POST /api/v1/groups/:group_id/shop/:task_id/buy
pub async fn buy_task(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, task_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<BuyTaskRequest>,
) -> Result<(StatusCode, Json<BuyTaskResponse>), ApiError> {
    let response = MarketplaceService::new(state.pool.clone())
        .buy_task(
            task_id,
            group_id,
            user_auth.user_id,
            request.assign_to_user_id,
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}
