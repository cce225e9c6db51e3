//! Identity token extractor.
//!
//! Verifies the identity provider's Bearer token and yields the user ID.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAuth {
    /// User ID from the token's subject claim.
    pub user_id: Uuid,
}

/// Returns the token of an `Authorization: Bearer <token>` header value.
pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let user_id = state.identity.authenticate(token).map_err(|e| {
            tracing::debug!(error = %e, "Identity token rejected");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(UserAuth { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header("Authorization", v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_header(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        assert!(matches!(
            bearer_token(&parts_with_header(None)),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(bearer_token(&parts_with_header(Some("Basic dXNlcg=="))).is_err());
        assert!(bearer_token(&parts_with_header(Some("Bearer "))).is_err());
    }
}
