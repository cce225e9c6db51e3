//! Task catalog: task definitions and their interval schedules.

use chrono::{DateTime, Utc};
use domain::models::{
    CreateTaskRequest, ShopTask, Task, TaskInterval, TaskKind, TaskWithIntervals,
};
use domain::DomainError;
use persistence::repositories::{NewTask, TaskRepository, UserTaskRepository};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::ledger::LedgerService;

#[derive(Clone)]
pub struct TaskCatalogService {
    pool: PgPool,
    tasks: TaskRepository,
    ledger: LedgerService,
}

impl TaskCatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tasks: TaskRepository::new(pool.clone()),
            ledger: LedgerService::new(pool.clone()),
            pool,
        }
    }

    /// Creates a task with its schedule.
    ///
    /// A learning task is assigned to every current member in the same
    /// transaction, due at `now`. A shop task gets no assignments.
    pub async fn create_task(
        &self,
        group_id: Uuid,
        creator_id: Uuid,
        request: &CreateTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<TaskWithIntervals, DomainError> {
        self.ledger.require_member(creator_id, group_id).await?;
        request
            .validate()
            .map_err(|e| DomainError::BadRequest(e.to_string()))?;

        let new_task = NewTask {
            group_id,
            created_by: creator_id,
            text: request.text.trim(),
            description: request.description.as_deref(),
            max_repetitions: request.max_repetitions,
            cost_coins: request.cost_coins,
        };

        let mut tx = self.pool.begin().await?;
        let task: Task = TaskRepository::insert(&mut tx, &new_task).await?.into();
        let intervals: Vec<TaskInterval> =
            TaskRepository::insert_intervals(&mut tx, task.id, &request.intervals)
                .await?
                .into_iter()
                .map(Into::into)
                .collect();

        let assigned = match task.kind() {
            TaskKind::Learning => UserTaskRepository::fan_out(&mut tx, task.id, group_id, now).await?,
            TaskKind::Shop => 0,
        };
        tx.commit().await?;

        info!(
            task_id = %task.id,
            group_id = %group_id,
            user_id = %creator_id,
            kind = ?task.kind(),
            assigned,
            "Task created"
        );

        Ok(TaskWithIntervals::new(task, intervals))
    }

    /// Deletes a task. Only its creator may delete it; assignments are kept.
    pub async fn delete_task(&self, task_id: Uuid, requester_id: Uuid) -> Result<(), DomainError> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Task not found".to_string()))?;

        if task.created_by != requester_id {
            return Err(DomainError::Forbidden(
                "Only the task creator can delete it".to_string(),
            ));
        }

        self.tasks.delete(task_id).await?;
        info!(task_id = %task_id, user_id = %requester_id, "Task deleted");
        Ok(())
    }

    /// Shop tasks of the group, annotated with whether the viewer can afford them.
    pub async fn list_shop_tasks(
        &self,
        group_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<Vec<ShopTask>, DomainError> {
        let membership = self.ledger.require_member(viewer_id, group_id).await?;
        let tasks = self.tasks.find_shop_tasks(group_id).await?;

        Ok(tasks
            .into_iter()
            .map(|t| ShopTask::for_viewer(t.into(), membership.coins))
            .collect())
    }

    /// All tasks of the group with their schedules, newest first.
    pub async fn list_group_tasks(
        &self,
        group_id: Uuid,
        viewer_id: Uuid,
    ) -> Result<Vec<TaskWithIntervals>, DomainError> {
        self.ledger.require_member(viewer_id, group_id).await?;
        let tasks = self.tasks.find_group_tasks(group_id).await?;
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();

        let mut schedules: HashMap<Uuid, Vec<TaskInterval>> = HashMap::new();
        for interval in self.tasks.find_intervals_for_tasks(&ids).await? {
            schedules
                .entry(interval.task_id)
                .or_default()
                .push(interval.into());
        }

        Ok(tasks
            .into_iter()
            .map(|t| {
                let intervals = schedules.remove(&t.id).unwrap_or_default();
                TaskWithIntervals::new(t.into(), intervals)
            })
            .collect())
    }
}
