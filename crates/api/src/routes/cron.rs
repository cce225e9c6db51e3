//! Endpoints for the external periodic trigger.

use axum::{extract::State, Json};
use chrono::Utc;
use domain::models::{ExpirationSummary, ReminderSummary};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CronAuth;
use crate::services::{ExpirationSweeper, ReminderDispatcher};

/// POST /api/v1/cron/expire-overdue
pub async fn expire_overdue(
    State(state): State<AppState>,
    _cron: CronAuth,
) -> Result<Json<ExpirationSummary>, ApiError> {
    info!("Expiration sweep triggered");
    let summary = ExpirationSweeper::new(state.pool.clone(), state.config.scheduler)
        .expire_overdue(Utc::now())
        .await?;
    Ok(Json(summary))
}

/// POST /api/v1/cron/send-reminders
pub async fn send_reminders(
    State(state): State<AppState>,
    _cron: CronAuth,
) -> Result<Json<ReminderSummary>, ApiError> {
    info!("Reminder dispatch triggered");
    let summary = ReminderDispatcher::new(
        state.pool.clone(),
        state.push_sender.clone(),
        state.config.scheduler,
    )
    .send_daily_reminders(Utc::now())
    .await?;
    Ok(Json(summary))
}
