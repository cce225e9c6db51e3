//! Integration tests for daily reminders and push subscriptions.

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{
    create_group_with_members, create_task, learning_task, scheduler_config, shop_task, test_pool,
};
use domain::models::ReminderSummary;
use domain::services::MockNotificationService;
use domain::DomainError;
use pamatovacek_api::services::{
    MarketplaceService, PushSubscriptionService, ReminderDispatcher,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// 09:00 on a day no other test is likely to use.
fn unique_day() -> DateTime<Utc> {
    let bytes = *Uuid::new_v4().as_bytes();
    let offset = i64::from(u16::from_be_bytes([bytes[0], bytes[1]]) % 3650);
    Utc.with_ymd_and_hms(2040, 1, 1, 9, 0, 0).unwrap() + Duration::days(offset)
}

fn endpoint() -> String {
    format!("https://push.example.com/send/{}", Uuid::new_v4())
}

/// Makes the store refuse to delete subscriptions under `/locked/`.
async fn refuse_locked_deletes(pool: &PgPool) {
    sqlx::query(
        r#"
        CREATE OR REPLACE FUNCTION refuse_locked_subscription_delete() RETURNS trigger AS $$
        BEGIN
            IF OLD.endpoint LIKE '%/locked/%' THEN
                RAISE EXCEPTION 'subscription % is locked', OLD.endpoint;
            END IF;
            RETURN OLD;
        END;
        $$ LANGUAGE plpgsql
        "#,
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        DO $$
        BEGIN
            IF NOT EXISTS (
                SELECT 1 FROM pg_trigger WHERE tgname = 'refuse_locked_subscription_delete'
            ) THEN
                CREATE TRIGGER refuse_locked_subscription_delete
                    BEFORE DELETE ON push_subscriptions
                    FOR EACH ROW EXECUTE FUNCTION refuse_locked_subscription_delete();
            END IF;
        END
        $$
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_daily_reminders_one_message_per_task() {
    let Some(pool) = test_pool().await else { return };
    let now = unique_day();
    let group = create_group_with_members(&pool, 1).await;
    let member = group.members[0];
    let learning = create_task(&pool, &group, &learning_task(2, vec![1]), now).await;
    let shop = create_task(&pool, &group, &shop_task(10), now).await;
    MarketplaceService::new(pool.clone())
        .buy_task(shop.task.id, group.id(), group.creator, member, now)
        .await
        .unwrap();

    let live = endpoint();
    let gone = endpoint();
    let subscriptions = PushSubscriptionService::new(pool.clone());
    subscriptions.subscribe(member, &live, "p256dh-key", "auth-key").await.unwrap();
    subscriptions.subscribe(member, &gone, "p256dh-key", "auth-key").await.unwrap();

    let sender = MockNotificationService::new().with_gone_endpoint(gone.clone());
    let dispatcher =
        ReminderDispatcher::new(pool.clone(), Arc::new(sender.clone()), scheduler_config());

    let summary = dispatcher.send_daily_reminders(now).await.unwrap();
    assert_eq!(
        summary,
        ReminderSummary {
            users_notified: 1,
            sent: 2,
            failed: 0,
            removed_subscriptions: 1,
            errors: 0,
        }
    );

    let sent = sender.sent_messages();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|(to, _)| to == &live));
    let titles: Vec<&str> = sent.iter().map(|(_, m)| m.title.as_str()).collect();
    assert!(titles.contains(&format!("📚 {}", learning.task.text).as_str()));
    assert!(titles.contains(&format!("🛒 {}", shop.task.text).as_str()));
    for (_, message) in &sent {
        assert_eq!(message.url, format!("/group/{}", group.id()));
        assert!(message.body.contains("10 coins"));
        let user_task_id = message.user_task_id.unwrap();
        assert_eq!(message.tag, Some(format!("task-{}", user_task_id)));
    }

    // The gone endpoint was removed
    let remaining = subscriptions.list(member).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].endpoint, live);

    // Tasks due tomorrow are not reminded today
    let sent_before = sender.sent_messages().len();
    let summary = dispatcher
        .send_daily_reminders(now + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(summary.sent, 0);
    assert_eq!(sender.sent_messages().len(), sent_before);
}

#[tokio::test]
async fn test_failed_deliveries_are_counted_and_kept() {
    let Some(pool) = test_pool().await else { return };
    let now = unique_day();
    let group = create_group_with_members(&pool, 0).await;
    create_task(&pool, &group, &learning_task(1, vec![1]), now).await;

    let subscriptions = PushSubscriptionService::new(pool.clone());
    subscriptions
        .subscribe(group.creator, &endpoint(), "p256dh-key", "auth-key")
        .await
        .unwrap();

    let dispatcher = ReminderDispatcher::new(
        pool.clone(),
        Arc::new(MockNotificationService::failing()),
        scheduler_config(),
    );
    let summary = dispatcher.send_daily_reminders(now).await.unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.sent, 0);
    assert_eq!(summary.users_notified, 0);
    assert_eq!(subscriptions.list(group.creator).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_error_for_one_user_does_not_stop_the_batch() {
    let Some(pool) = test_pool().await else { return };
    refuse_locked_deletes(&pool).await;
    let now = unique_day();
    let group = create_group_with_members(&pool, 1).await;
    let member = group.members[0];
    create_task(&pool, &group, &learning_task(1, vec![1]), now).await;

    let locked = format!("https://push.example.com/locked/{}", Uuid::new_v4());
    let live = endpoint();
    let subscriptions = PushSubscriptionService::new(pool.clone());
    subscriptions.subscribe(group.creator, &locked, "p256dh-key", "auth-key").await.unwrap();
    subscriptions.subscribe(member, &live, "p256dh-key", "auth-key").await.unwrap();

    // The creator's endpoint is gone but cannot be removed
    let sender = MockNotificationService::new().with_gone_endpoint(locked.clone());
    let dispatcher =
        ReminderDispatcher::new(pool.clone(), Arc::new(sender.clone()), scheduler_config());

    let summary = dispatcher.send_daily_reminders(now).await.unwrap();
    assert_eq!(
        summary,
        ReminderSummary {
            users_notified: 1,
            sent: 1,
            failed: 0,
            removed_subscriptions: 0,
            errors: 1,
        }
    );

    let sent = sender.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, live);
    assert_eq!(subscriptions.list(group.creator).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_subscription_bookkeeping_and_test_message() {
    let Some(pool) = test_pool().await else { return };
    let user = Uuid::new_v4();
    let subscriptions = PushSubscriptionService::new(pool.clone());
    let sender = MockNotificationService::new();
    let dispatcher =
        ReminderDispatcher::new(pool.clone(), Arc::new(sender.clone()), scheduler_config());

    let result = dispatcher.send_test_notification(user).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));

    let url = endpoint();
    subscriptions.subscribe(user, &url, "old-key", "old-auth").await.unwrap();
    let updated = subscriptions.subscribe(user, &url, "new-key", "new-auth").await.unwrap();
    assert_eq!(updated.p256dh, "new-key");
    assert_eq!(subscriptions.list(user).await.unwrap().len(), 1);

    let response = dispatcher.send_test_notification(user).await.unwrap();
    assert_eq!(response.sent, 1);
    assert_eq!(response.total, 1);
    let sent = sender.sent_messages();
    assert_eq!(sent[0].1.url, "/dashboard");

    subscriptions.unsubscribe(user, &url).await.unwrap();
    assert!(subscriptions.list(user).await.unwrap().is_empty());
    let result = subscriptions.unsubscribe(user, &url).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}
