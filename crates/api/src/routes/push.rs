//! Push subscription routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::{
    PushSubscription, SubscribeRequest, TestNotificationResponse, UnsubscribeRequest,
};
use validator::Validate;

use super::ListResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::{PushSubscriptionService, ReminderDispatcher};

/// Register a push endpoint. Re-subscribing an endpoint replaces its keys.
///
/// POST /api/v1/push/subscriptions
pub async fn subscribe(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<PushSubscription>), ApiError> {
    request.validate()?;

    let subscription = PushSubscriptionService::new(state.pool.clone())
        .subscribe(
            user_auth.user_id,
            &request.endpoint,
            &request.p256dh,
            &request.auth,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// DELETE /api/v1/push/subscriptions
pub async fn unsubscribe(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<StatusCode, ApiError> {
    PushSubscriptionService::new(state.pool.clone())
        .unsubscribe(user_auth.user_id, &request.endpoint)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/push/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<ListResponse<PushSubscription>>, ApiError> {
    let subscriptions = PushSubscriptionService::new(state.pool.clone())
        .list(user_auth.user_id)
        .await?;
    Ok(Json(subscriptions.into()))
}

/// Send a test message to all of the caller's endpoints.
///
/// POST /api/v1/push/test
pub async fn send_test(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<TestNotificationResponse>, ApiError> {
    let response = ReminderDispatcher::new(
        state.pool.clone(),
        state.push_sender.clone(),
        state.config.scheduler,
    )
    .send_test_notification(user_auth.user_id)
    .await?;
    Ok(Json(response))
}
