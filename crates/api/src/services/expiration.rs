//! Expiration sweeper: fails assignments left overdue past the daily deadline.

use chrono::{DateTime, Utc};
use domain::models::{ExpirationSummary, HistoryOutcome};
use domain::services::expiration_deadline;
use domain::{DomainError, SchedulerConfig};
use persistence::entities::OverdueUserTaskEntity;
use persistence::repositories::{LedgerRepository, TaskHistoryRepository, UserTaskRepository};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::middleware::metrics::{record_coins_credited, record_user_tasks_expired};

#[derive(Clone)]
pub struct ExpirationSweeper {
    pool: PgPool,
    user_tasks: UserTaskRepository,
    config: SchedulerConfig,
}

impl ExpirationSweeper {
    pub fn new(pool: PgPool, config: SchedulerConfig) -> Self {
        Self {
            user_tasks: UserTaskRepository::new(pool.clone()),
            pool,
            config,
        }
    }

    /// Fails every pending assignment due at or before the latest deadline.
    ///
    /// Each assignment is handled in its own transaction. The task creator
    /// receives the penalty. A failure on one item is logged and the sweep
    /// continues; rerunning the sweep fails nothing twice.
    pub async fn expire_overdue(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ExpirationSummary, DomainError> {
        let deadline =
            expiration_deadline(now, self.config.deadline_hour, self.config.timezone());
        let overdue = self.user_tasks.find_overdue(deadline).await?;

        let mut failed_count = 0;
        let mut errors = 0;
        for item in &overdue {
            match self.expire_one(item, deadline, now).await {
                Ok(true) => failed_count += 1,
                Ok(false) => {}
                Err(e) => {
                    errors += 1;
                    warn!(user_task_id = %item.id, error = %e, "Failed to expire user task");
                }
            }
        }

        record_user_tasks_expired(failed_count);
        info!(
            failed_count,
            errors,
            deadline = %deadline,
            candidates = overdue.len(),
            "Expiration sweep finished"
        );

        Ok(ExpirationSummary {
            failed_count,
            processed_at: now,
            deadline,
            errors,
        })
    }

    /// Returns `false` when the assignment was completed or expired meanwhile.
    async fn expire_one(
        &self,
        item: &OverdueUserTaskEntity,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await?;
        if UserTaskRepository::fail_overdue(&mut tx, item.id, deadline).await? == 0 {
            return Ok(false);
        }

        TaskHistoryRepository::record(
            &mut tx,
            item.id,
            item.current_repetition,
            HistoryOutcome::Failed,
            now,
        )
        .await?;

        let penalty = self.config.failure_penalty;
        let credited =
            LedgerRepository::credit(&mut tx, item.task_created_by, item.group_id, penalty)
                .await?
                .is_some();
        if !credited {
            warn!(
                user_task_id = %item.id,
                creator_id = %item.task_created_by,
                group_id = %item.group_id,
                "Task creator is no longer a member, penalty skipped"
            );
        }
        tx.commit().await?;
        if credited {
            record_coins_credited(penalty);
        }

        info!(
            user_task_id = %item.id,
            user_id = %item.user_id,
            task_id = %item.task_id,
            repetition = item.current_repetition,
            "User task expired"
        );
        Ok(true)
    }
}
