//! Push subscriptions and HTTP delivery.

use async_trait::async_trait;
use domain::models::PushSubscription;
use domain::services::{NotificationResult, PushMessage, PushSender};
use domain::DomainError;
use persistence::repositories::PushSubscriptionRepository;
use reqwest::{Client, StatusCode};
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Delivers push messages by POSTing their JSON payload to the endpoint.
#[derive(Clone)]
pub struct HttpPushSender {
    client: Client,
}

impl HttpPushSender {
    pub fn new(timeout_ms: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { client })
    }
}

/// Maps an endpoint's response status to a delivery result.
fn classify_status(status: StatusCode) -> NotificationResult {
    if status.is_success() {
        NotificationResult::Sent
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        NotificationResult::Gone
    } else {
        NotificationResult::Failed(format!("endpoint responded with {}", status))
    }
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
    ) -> NotificationResult {
        let response = self
            .client
            .post(&subscription.endpoint)
            .header("TTL", "86400")
            .json(message)
            .send()
            .await;

        match response {
            Ok(response) => {
                let result = classify_status(response.status());
                debug!(
                    endpoint = %subscription.endpoint,
                    status = %response.status(),
                    "Push delivered"
                );
                result
            }
            Err(e) => NotificationResult::Failed(e.to_string()),
        }
    }
}

/// Push-subscription bookkeeping for a user.
#[derive(Clone)]
pub struct PushSubscriptionService {
    repo: PushSubscriptionRepository,
}

impl PushSubscriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: PushSubscriptionRepository::new(pool),
        }
    }

    /// Stores a subscription. Subscribing the same endpoint again replaces its keys.
    pub async fn subscribe(
        &self,
        user_id: Uuid,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
    ) -> Result<PushSubscription, DomainError> {
        let subscription = self.repo.upsert(user_id, endpoint, p256dh, auth).await?;
        info!(user_id = %user_id, "Push subscription saved");
        Ok(subscription.into())
    }

    pub async fn unsubscribe(&self, user_id: Uuid, endpoint: &str) -> Result<(), DomainError> {
        if !self.repo.delete_for_user(user_id, endpoint).await? {
            return Err(DomainError::NotFound("Subscription not found".to_string()));
        }
        info!(user_id = %user_id, "Push subscription removed");
        Ok(())
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<PushSubscription>, DomainError> {
        let rows = self.repo.find_by_user(user_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        assert_eq!(classify_status(StatusCode::CREATED), NotificationResult::Sent);
        assert_eq!(classify_status(StatusCode::OK), NotificationResult::Sent);
    }

    #[test]
    fn test_classify_gone_endpoints() {
        assert_eq!(classify_status(StatusCode::GONE), NotificationResult::Gone);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), NotificationResult::Gone);
    }

    #[test]
    fn test_classify_other_failures() {
        match classify_status(StatusCode::TOO_MANY_REQUESTS) {
            NotificationResult::Failed(reason) => assert!(reason.contains("429")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_sender_builds() {
        assert!(HttpPushSender::new(5000).is_ok());
    }
}
