//! Integration tests for groups and the task catalog.

mod common;

use chrono::{TimeZone, Utc};
use common::{
    balance, create_group_with_members, create_task, learning_task, scheduler_config, shop_task,
    test_pool, user_task_id,
};
use domain::models::TaskKind;
use domain::DomainError;
use pamatovacek_api::services::{GroupService, RepetitionScheduler, TaskCatalogService};
use uuid::Uuid;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2037, 9, 14, 8, 30, 0).unwrap()
}

#[tokio::test]
async fn test_learning_task_fans_out_to_members() {
    let Some(pool) = test_pool().await else { return };
    let group = create_group_with_members(&pool, 2).await;
    let task = create_task(&pool, &group, &learning_task(3, vec![1, 3]), now()).await;

    assert_eq!(task.kind, TaskKind::Learning);
    assert_eq!(task.intervals.len(), 2);
    assert_eq!(task.intervals[1].sequence_number, 2);
    assert_eq!(task.intervals[1].interval_days, 3);

    let scheduler = RepetitionScheduler::new(pool.clone(), scheduler_config());
    for user in std::iter::once(group.creator).chain(group.members.iter().copied()) {
        let due = scheduler.due_tasks(user, group.id(), now()).await.unwrap();
        assert_eq!(due.len(), 1, "user {} should have the task", user);
        assert_eq!(due[0].next_show_date, now());
    }
}

#[tokio::test]
async fn test_later_members_are_not_assigned_retroactively() {
    let Some(pool) = test_pool().await else { return };
    let group = create_group_with_members(&pool, 0).await;
    create_task(&pool, &group, &learning_task(2, vec![1]), now()).await;

    let newcomer = Uuid::new_v4();
    GroupService::new(pool.clone(), scheduler_config())
        .invite_member(group.id(), group.creator, newcomer)
        .await
        .unwrap();

    let due = RepetitionScheduler::new(pool.clone(), scheduler_config())
        .due_tasks(newcomer, group.id(), now())
        .await
        .unwrap();
    assert!(due.is_empty());
}

#[tokio::test]
async fn test_create_task_requires_membership_and_valid_schedule() {
    let Some(pool) = test_pool().await else { return };
    let group = create_group_with_members(&pool, 0).await;
    let catalog = TaskCatalogService::new(pool.clone());

    let result = catalog
        .create_task(group.id(), Uuid::new_v4(), &learning_task(2, vec![1]), now())
        .await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));

    // Three repetitions need at least two intervals
    let result = catalog
        .create_task(group.id(), group.creator, &learning_task(3, vec![1]), now())
        .await;
    assert!(matches!(result, Err(DomainError::BadRequest(_))));
}

#[tokio::test]
async fn test_delete_task_creator_only_keeps_assignments() {
    let Some(pool) = test_pool().await else { return };
    let group = create_group_with_members(&pool, 1).await;
    let task = create_task(&pool, &group, &learning_task(2, vec![1]), now()).await;
    let assignment = user_task_id(&pool, task.task.id, group.members[0]).await;
    let catalog = TaskCatalogService::new(pool.clone());

    let result = catalog.delete_task(task.task.id, group.members[0]).await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));

    catalog.delete_task(task.task.id, group.creator).await.unwrap();

    let remaining_intervals: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM task_intervals WHERE task_id = $1")
            .bind(task.task.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining_intervals, 0);

    let orphan: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_tasks WHERE id = $1")
        .bind(assignment)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphan, 1);

    let result = catalog.delete_task(task.task.id, group.creator).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_list_group_tasks_newest_first() {
    let Some(pool) = test_pool().await else { return };
    let group = create_group_with_members(&pool, 0).await;
    let older = create_task(&pool, &group, &learning_task(2, vec![4]), now()).await;
    let newer = create_task(&pool, &group, &shop_task(25), now()).await;

    let tasks = TaskCatalogService::new(pool.clone())
        .list_group_tasks(group.id(), group.creator)
        .await
        .unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].task.id, newer.task.id);
    assert_eq!(tasks[0].kind, TaskKind::Shop);
    assert_eq!(tasks[1].task.id, older.task.id);
    assert_eq!(tasks[1].intervals[0].interval_days, 4);
}

#[tokio::test]
async fn test_group_membership_rules() {
    let Some(pool) = test_pool().await else { return };
    let groups = GroupService::new(pool.clone(), scheduler_config());
    let group = create_group_with_members(&pool, 1).await;
    let member = group.members[0];

    assert_eq!(balance(&pool, group.creator, group.id()).await, 100);
    assert_eq!(balance(&pool, member, group.id()).await, 100);

    // Only the creator invites, and nobody twice
    let result = groups.invite_member(group.id(), member, Uuid::new_v4()).await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));
    let result = groups.invite_member(group.id(), group.creator, member).await;
    assert!(matches!(result, Err(DomainError::BadRequest(_))));

    let details = groups.group_details(group.id(), member).await.unwrap();
    assert_eq!(details.members.len(), 2);
    assert_eq!(details.my_coins, 100);

    let mine = groups.list_my_groups(member).await.unwrap();
    let summary = mine.iter().find(|g| g.id == group.id()).unwrap();
    assert_eq!(summary.member_count, 2);
    assert_eq!(summary.my_coins, 100);

    // The creator cannot leave; a member can
    let result = groups.leave_group(group.id(), group.creator).await;
    assert!(matches!(result, Err(DomainError::BadRequest(_))));
    groups.leave_group(group.id(), member).await.unwrap();
    let result = groups.group_details(group.id(), member).await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));

    let result = groups.delete_group(group.id(), member).await;
    assert!(matches!(result, Err(DomainError::Forbidden(_))));
    groups.delete_group(group.id(), group.creator).await.unwrap();
    let result = groups.group_details(group.id(), group.creator).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}
