//! Daily push reminders for tasks due today.

use chrono::{DateTime, Utc};
use domain::models::{
    DueTask, PushSubscription, ReminderSummary, TestNotificationResponse,
};
use domain::services::{reminder_window, NotificationResult, PushMessage, PushSender};
use domain::{DomainError, SchedulerConfig};
use persistence::repositories::{PushSubscriptionRepository, UserTaskRepository};
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::middleware::metrics::record_reminders_sent;

#[derive(Clone)]
pub struct ReminderDispatcher {
    user_tasks: UserTaskRepository,
    subscriptions: PushSubscriptionRepository,
    sender: Arc<dyn PushSender>,
    config: SchedulerConfig,
}

impl ReminderDispatcher {
    pub fn new(pool: PgPool, sender: Arc<dyn PushSender>, config: SchedulerConfig) -> Self {
        Self {
            user_tasks: UserTaskRepository::new(pool.clone()),
            subscriptions: PushSubscriptionRepository::new(pool),
            sender,
            config,
        }
    }

    /// Sends one reminder per pending task due during the current local day
    /// to every subscription of its assignee.
    ///
    /// Endpoints reported gone are deleted and not retried. A storage error
    /// while handling one user's subscriptions is logged and counted, and
    /// the remaining users are still reminded.
    pub async fn send_daily_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ReminderSummary, DomainError> {
        let (start, end) = reminder_window(now, self.config.timezone());
        let rows = self.user_tasks.find_pending_between(start, end).await?;

        let mut by_user: BTreeMap<Uuid, Vec<DueTask>> = BTreeMap::new();
        for row in rows {
            let user_id = row.user_id;
            by_user.entry(user_id).or_default().push(row.into());
        }

        let mut summary = ReminderSummary::default();
        for (user_id, tasks) in by_user {
            let subscriptions = match self.subscriptions.find_by_user(user_id).await {
                Ok(subscriptions) => subscriptions,
                Err(e) => {
                    summary.errors += 1;
                    warn!(user_id = %user_id, error = %e, "Failed to load push subscriptions");
                    continue;
                }
            };
            if subscriptions.is_empty() {
                debug!(user_id = %user_id, "No push subscriptions, skipping reminders");
                continue;
            }

            let mut live: Vec<PushSubscription> =
                subscriptions.into_iter().map(Into::into).collect();
            let mut delivered = false;
            for task in &tasks {
                let message = PushMessage::task_reminder(task, self.config.completion_reward);
                let mut gone = Vec::new();
                for subscription in &live {
                    match self.sender.send(subscription, &message).await {
                        NotificationResult::Sent => {
                            summary.sent += 1;
                            delivered = true;
                        }
                        NotificationResult::Gone => gone.push(subscription.endpoint.clone()),
                        NotificationResult::Failed(reason) => {
                            summary.failed += 1;
                            warn!(
                                user_id = %user_id,
                                user_task_id = %task.user_task_id,
                                reason = %reason,
                                "Push delivery failed"
                            );
                        }
                    }
                }
                for endpoint in gone {
                    match self.subscriptions.delete_by_endpoint(&endpoint).await {
                        Ok(true) => summary.removed_subscriptions += 1,
                        Ok(false) => {}
                        Err(e) => {
                            summary.errors += 1;
                            warn!(
                                user_id = %user_id,
                                endpoint = %endpoint,
                                error = %e,
                                "Failed to remove gone push subscription"
                            );
                        }
                    }
                    live.retain(|s| s.endpoint != endpoint);
                }
            }
            if delivered {
                summary.users_notified += 1;
            }
        }

        record_reminders_sent(summary.sent);
        info!(
            users_notified = summary.users_notified,
            sent = summary.sent,
            failed = summary.failed,
            removed_subscriptions = summary.removed_subscriptions,
            errors = summary.errors,
            "Daily reminders dispatched"
        );
        Ok(summary)
    }

    /// Sends a test message to every subscription of the user.
    pub async fn send_test_notification(
        &self,
        user_id: Uuid,
    ) -> Result<TestNotificationResponse, DomainError> {
        let subscriptions = self.subscriptions.find_by_user(user_id).await?;
        if subscriptions.is_empty() {
            return Err(DomainError::NotFound(
                "No push subscriptions found".to_string(),
            ));
        }

        let message = PushMessage::test_message();
        let total = subscriptions.len();
        let mut sent = 0;
        for subscription in subscriptions {
            let subscription: PushSubscription = subscription.into();
            match self.sender.send(&subscription, &message).await {
                NotificationResult::Sent => sent += 1,
                NotificationResult::Gone => {
                    self.subscriptions
                        .delete_by_endpoint(&subscription.endpoint)
                        .await?;
                }
                NotificationResult::Failed(reason) => {
                    warn!(user_id = %user_id, reason = %reason, "Test notification failed");
                }
            }
        }

        Ok(TestNotificationResponse { sent, total })
    }
}
