//! Shared-secret extractor for the external periodic trigger.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::user_auth::bearer_token;
use crate::app::AppState;
use crate::error::ApiError;

/// Proof that the request carries the configured cron secret.
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

/// Compares without short-circuiting on the first differing byte.
fn secrets_match(expected: &str, given: &str) -> bool {
    expected.len() == given.len()
        && expected
            .bytes()
            .zip(given.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[async_trait]
impl FromRequestParts<AppState> for CronAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = &state.config.cron.secret;
        if expected.is_empty() {
            return Err(ApiError::Unauthorized(
                "Cron endpoints are disabled".to_string(),
            ));
        }

        let token = bearer_token(parts)?;
        if !secrets_match(expected, token) {
            tracing::warn!("Unauthorized cron attempt");
            return Err(ApiError::Unauthorized("Invalid cron secret".to_string()));
        }

        Ok(CronAuth)
    }
}
