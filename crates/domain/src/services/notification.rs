//! Push notification capability.
//!
//! The core only decides what to send. Delivery is behind [`PushSender`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::models::{DueTask, PushSubscription};

/// A message delivered to one push endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_task_id: Option<Uuid>,
}

impl PushMessage {
    /// Reminder for one due assignment.
    pub fn task_reminder(task: &DueTask, completion_reward: i32) -> Self {
        let emoji = if task.is_from_shop { "🛒" } else { "📚" };
        Self {
            title: format!("{} {}", emoji, task.text),
            body: format!("Due today! Complete to earn {} coins", completion_reward),
            url: format!("/group/{}", task.group_id),
            tag: Some(format!("task-{}", task.user_task_id)),
            user_task_id: Some(task.user_task_id),
        }
    }

    pub fn test_message() -> Self {
        Self {
            title: "🐝 Pamatovacek Test".to_string(),
            body: "Your notifications are working! You'll receive daily task reminders."
                .to_string(),
            url: "/dashboard".to_string(),
            tag: None,
            user_task_id: None,
        }
    }
}

/// Result of a push delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    /// Message was accepted by the endpoint.
    Sent,
    /// Endpoint no longer exists; the subscription should be removed.
    Gone,
    /// Delivery failed for another reason.
    Failed(String),
}

/// Delivers a message to one subscription's endpoint.
#[async_trait::async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
    ) -> NotificationResult;
}

/// Mock sender for development and testing.
///
/// Logs messages and records them instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    gone_endpoints: HashSet<String>,
    sent: Arc<Mutex<Vec<(String, PushMessage)>>>,
}

impl MockNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock sender that fails every delivery.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Report the given endpoint as gone.
    pub fn with_gone_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.gone_endpoints.insert(endpoint.into());
        self
    }

    /// Messages recorded so far, paired with their endpoint.
    pub fn sent_messages(&self) -> Vec<(String, PushMessage)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PushSender for MockNotificationService {
    async fn send(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
    ) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(
                endpoint = %subscription.endpoint,
                user_id = %subscription.user_id,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        if self.gone_endpoints.contains(&subscription.endpoint) {
            return NotificationResult::Gone;
        }

        tracing::info!(
            endpoint = %subscription.endpoint,
            user_id = %subscription.user_id,
            title = %message.title,
            "Mock: Would send push notification"
        );

        if let Ok(mut sent) = self.sent.lock() {
            sent.push((subscription.endpoint.clone(), message.clone()));
        }

        NotificationResult::Sent
    }
}
