//! Repetition scheduler: due lists and completions.

use chrono::{DateTime, Utc};
use domain::models::{
    CompleteTaskResponse, DueTask, HistoryOutcome, IntervalSchedule, TaskHistoryEntry,
    TaskStats, UserTask, UserTaskDetails,
};
use domain::services::{plan_completion, CompletionOutcome};
use domain::{DomainError, SchedulerConfig};
use persistence::repositories::{
    LedgerRepository, TaskHistoryRepository, TaskRepository, UserTaskRepository,
};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::ledger::LedgerService;
use crate::middleware::metrics::{record_coins_credited, record_task_completed};

#[derive(Clone)]
pub struct RepetitionScheduler {
    pool: PgPool,
    user_tasks: UserTaskRepository,
    tasks: TaskRepository,
    history: TaskHistoryRepository,
    ledger: LedgerService,
    config: SchedulerConfig,
}

impl RepetitionScheduler {
    pub fn new(pool: PgPool, config: SchedulerConfig) -> Self {
        Self {
            user_tasks: UserTaskRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool.clone()),
            history: TaskHistoryRepository::new(pool.clone()),
            ledger: LedgerService::new(pool.clone()),
            pool,
            config,
        }
    }

    /// Pending assignments of the user in the group due at `now`, earliest first.
    pub async fn due_tasks(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<DueTask>, DomainError> {
        self.ledger.require_member(user_id, group_id).await?;
        let rows = self.user_tasks.find_due(user_id, group_id, now).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All pending assignments of the user in the group, due or not.
    pub async fn pending_tasks(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<Vec<DueTask>, DomainError> {
        self.ledger.require_member(user_id, group_id).await?;
        let rows = self.user_tasks.find_pending(user_id, group_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_assignment(&self, user_task_id: Uuid) -> Result<UserTask, DomainError> {
        self.user_tasks
            .find_by_id(user_task_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| DomainError::NotFound("User task not found".to_string()))
    }

    /// Completes the current repetition of an assignment.
    ///
    /// The state change, its history row and the reward credit commit
    /// together. A concurrent completion or expiry of the same repetition
    /// makes the conditional update miss and yields `Conflict`.
    pub async fn complete(
        &self,
        user_task_id: Uuid,
        requester_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CompleteTaskResponse, DomainError> {
        let user_task = self.find_assignment(user_task_id).await?;
        if user_task.user_id != requester_id {
            return Err(DomainError::Unauthorized(
                "Not the assignee of this task".to_string(),
            ));
        }
        if !user_task.is_pending() {
            return Err(DomainError::Conflict(format!(
                "User task is already {}",
                user_task.status
            )));
        }

        let task = self
            .tasks
            .find_by_id(user_task.task_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Task not found".to_string()))?;
        let schedule = IntervalSchedule::new(
            self.tasks
                .find_intervals(task.id)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        );

        let outcome = plan_completion(&user_task, task.max_repetitions, &schedule, now)?;
        let reward = self.config.completion_reward;

        let mut tx = self.pool.begin().await?;
        let updated = match outcome {
            CompletionOutcome::Advanced {
                next_repetition,
                next_show_date,
            } => {
                UserTaskRepository::advance(
                    &mut tx,
                    user_task.id,
                    user_task.current_repetition,
                    next_repetition,
                    next_show_date,
                    now,
                )
                .await?
            }
            CompletionOutcome::Finished { final_repetition } => {
                UserTaskRepository::finish(
                    &mut tx,
                    user_task.id,
                    user_task.current_repetition,
                    final_repetition,
                    now,
                )
                .await?
            }
        };
        if updated == 0 {
            return Err(DomainError::Conflict(
                "User task was changed concurrently".to_string(),
            ));
        }

        TaskHistoryRepository::record(
            &mut tx,
            user_task.id,
            user_task.current_repetition,
            HistoryOutcome::Completed,
            now,
        )
        .await?;

        let coins_earned =
            match LedgerRepository::credit(&mut tx, user_task.user_id, user_task.group_id, reward)
                .await?
            {
                Some(_) => reward,
                None => {
                    warn!(
                        user_task_id = %user_task.id,
                        user_id = %user_task.user_id,
                        group_id = %user_task.group_id,
                        "Assignee is no longer a member, reward skipped"
                    );
                    0
                }
            };
        tx.commit().await?;

        let finished = matches!(outcome, CompletionOutcome::Finished { .. });
        record_task_completed(finished);
        record_coins_credited(coins_earned);

        info!(
            user_task_id = %user_task.id,
            user_id = %requester_id,
            repetition = user_task.current_repetition,
            finished,
            coins_earned,
            "Repetition completed"
        );

        Ok(CompleteTaskResponse {
            user_task_id: user_task.id,
            coins_earned,
            status: outcome.status(),
            current_repetition: outcome.repetition(),
            next_show_date: outcome.next_show_date(),
        })
    }

    /// Progress of an assignment. Visible to any member of its group.
    pub async fn task_stats(
        &self,
        user_task_id: Uuid,
        requester_id: Uuid,
    ) -> Result<TaskStats, DomainError> {
        let user_task = self.find_assignment(user_task_id).await?;
        self.ledger
            .require_member(requester_id, user_task.group_id)
            .await?;

        let task = self
            .tasks
            .find_by_id(user_task.task_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Task not found".to_string()))?;

        Ok(TaskStats::new(&user_task, task.max_repetitions))
    }

    /// The assignment with its task definition and schedule. Assignee only.
    pub async fn user_task_details(
        &self,
        user_task_id: Uuid,
        requester_id: Uuid,
    ) -> Result<UserTaskDetails, DomainError> {
        let user_task = self.find_assignment(user_task_id).await?;
        if user_task.user_id != requester_id {
            return Err(DomainError::Unauthorized(
                "Not the assignee of this task".to_string(),
            ));
        }

        let task = self
            .tasks
            .find_by_id(user_task.task_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Task not found".to_string()))?;
        let intervals = self
            .tasks
            .find_intervals(task.id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(UserTaskDetails {
            user_task,
            task: task.into(),
            intervals,
        })
    }

    /// Completion and failure records of an assignment. Assignee only.
    pub async fn history(
        &self,
        user_task_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<TaskHistoryEntry>, DomainError> {
        let user_task = self.find_assignment(user_task_id).await?;
        if user_task.user_id != requester_id {
            return Err(DomainError::Unauthorized(
                "Not the assignee of this task".to_string(),
            ));
        }

        let rows = self.history.find_by_user_task(user_task.id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
