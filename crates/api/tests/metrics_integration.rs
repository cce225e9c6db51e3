//! Integration tests for the coin counters.
//!
//! Kept in a binary of its own: the Prometheus recorder is process-global,
//! so the counters are only exact while no other test moves coins.

mod common;

use axum::response::IntoResponse;
use chrono::Utc;
use common::{
    create_group_with_members, create_task, learning_task, scheduler_config, shop_task,
    test_pool, user_task_id,
};
use domain::DomainError;
use pamatovacek_api::middleware::{init_metrics, metrics_handler};
use pamatovacek_api::services::{MarketplaceService, RepetitionScheduler};

async fn counter_value(name: &str) -> u64 {
    let response = metrics_handler().await.into_response();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    text.lines()
        .find_map(|line| line.strip_prefix(&format!("{} ", name)))
        .map(|value| value.trim().parse::<f64>().unwrap() as u64)
        .unwrap_or(0)
}

#[tokio::test]
async fn test_coin_counters_follow_committed_changes() {
    let Some(pool) = test_pool().await else { return };
    init_metrics().unwrap();
    let now = Utc::now();
    let group = create_group_with_members(&pool, 1).await;
    let member = group.members[0];
    let marketplace = MarketplaceService::new(pool.clone());

    // A rejected purchase moves no coins and counts none
    let expensive = create_task(&pool, &group, &shop_task(500), now).await;
    let result = marketplace
        .buy_task(expensive.task.id, group.id(), member, member, now)
        .await;
    assert!(matches!(result, Err(DomainError::InsufficientFunds { .. })));
    assert_eq!(counter_value("coins_debited_total").await, 0);

    let affordable = create_task(&pool, &group, &shop_task(30), now).await;
    marketplace
        .buy_task(affordable.task.id, group.id(), member, group.creator, now)
        .await
        .unwrap();
    assert_eq!(counter_value("coins_debited_total").await, 30);

    // A completion counts its reward once
    let learning = create_task(&pool, &group, &learning_task(2, vec![1]), now).await;
    let assignment = user_task_id(&pool, learning.task.id, member).await;
    let scheduler = RepetitionScheduler::new(pool.clone(), scheduler_config());
    scheduler.complete(assignment, member, now).await.unwrap();
    assert_eq!(counter_value("coins_credited_total").await, 10);

    scheduler.complete(assignment, member, now).await.unwrap();
    assert_eq!(counter_value("coins_credited_total").await, 20);

    // Completing a finished task is rejected and pays nothing
    let result = scheduler.complete(assignment, member, now).await;
    assert!(matches!(result, Err(DomainError::Conflict(_))));
    assert_eq!(counter_value("coins_credited_total").await, 20);
}
