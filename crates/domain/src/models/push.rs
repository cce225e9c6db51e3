//! Push subscription bookkeeping models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A delivery endpoint registered by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PushSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for registering an endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SubscribeRequest {
    #[validate(
        length(min = 1, max = 2048, message = "Endpoint must be between 1 and 2048 characters"),
        custom(function = "shared::validation::validate_push_endpoint")
    )]
    pub endpoint: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub p256dh: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub auth: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// Outcome of a test notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TestNotificationResponse {
    pub sent: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_request_validation() {
        let ok = SubscribeRequest {
            endpoint: "https://push.example.com/send/abc".to_string(),
            p256dh: "key".to_string(),
            auth: "secret".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_scheme = SubscribeRequest {
            endpoint: "ftp://push.example.com".to_string(),
            ..ok.clone()
        };
        assert!(bad_scheme.validate().is_err());

        let blank_key = SubscribeRequest {
            p256dh: " ".to_string(),
            ..ok
        };
        assert!(blank_key.validate().is_err());
    }
}
