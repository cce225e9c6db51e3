//! Group routes: creation, membership and balances.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateGroupRequest, Group, GroupDetails, GroupMembership, GroupSummary, InviteMemberRequest,
};
use uuid::Uuid;
use validator::Validate;

use super::ListResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::GroupService;

fn service(state: &AppState) -> GroupService {
    GroupService::new(state.pool.clone(), state.config.scheduler)
}

/// Create a new group. The creator becomes its first member.
///
/// POST /api/v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    request.validate()?;

    let group = service(&state)
        .create_group(&request.name, user_auth.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// List groups the current user belongs to, with their balance in each.
///
/// GET /api/v1/groups
pub async fn list_groups(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ListResponse<GroupSummary>>, ApiError> {
    let groups = service(&state).list_my_groups(user_auth.user_id).await?;
    Ok(Json(groups.into()))
}

/// GET /api/v1/groups/:group_id
pub async fn get_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetails>, ApiError> {
    let details = service(&state)
        .group_details(group_id, user_auth.user_id)
        .await?;
    Ok(Json(details))
}

/// Delete a group and everything in it. Creator only.
///
/// DELETE /api/v1/groups/:group_id
pub async fn delete_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service(&state)
        .delete_group(group_id, user_auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to the group. Creator only.
///
/// POST /api/v1/groups/:group_id/members
pub async fn invite_member(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<InviteMemberRequest>,
) -> Result<(StatusCode, Json<GroupMembership>), ApiError> {
    let membership = service(&state)
        .invite_member(group_id, user_auth.user_id, request.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// POST /api/v1/groups/:group_id/leave
pub async fn leave_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service(&state)
        .leave_group(group_id, user_auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
