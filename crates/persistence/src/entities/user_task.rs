//! User task entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{DueTask, UserTask, UserTaskStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_task_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_task_status", rename_all = "lowercase")]
pub enum UserTaskStatusDb {
    Pending,
    Completed,
    Failed,
}

impl From<UserTaskStatusDb> for UserTaskStatus {
    fn from(db: UserTaskStatusDb) -> Self {
        match db {
            UserTaskStatusDb::Pending => UserTaskStatus::Pending,
            UserTaskStatusDb::Completed => UserTaskStatus::Completed,
            UserTaskStatusDb::Failed => UserTaskStatus::Failed,
        }
    }
}

/// Database row mapping for the user_tasks table.
#[derive(Debug, Clone, FromRow)]
pub struct UserTaskEntity {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub current_repetition: i32,
    pub next_show_date: DateTime<Utc>,
    pub last_shown_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: UserTaskStatusDb,
    pub created_at: DateTime<Utc>,
}

impl From<UserTaskEntity> for UserTask {
    fn from(entity: UserTaskEntity) -> Self {
        Self {
            id: entity.id,
            task_id: entity.task_id,
            user_id: entity.user_id,
            group_id: entity.group_id,
            current_repetition: entity.current_repetition,
            next_show_date: entity.next_show_date,
            last_shown_at: entity.last_shown_at,
            completed_at: entity.completed_at,
            status: entity.status.into(),
            created_at: entity.created_at,
        }
    }
}

/// A pending user task joined with its task definition.
#[derive(Debug, Clone, FromRow)]
pub struct DueTaskEntity {
    pub user_task_id: Uuid,
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub group_id: Uuid,
    pub text: String,
    pub description: Option<String>,
    pub current_repetition: i32,
    pub max_repetitions: i32,
    pub next_show_date: DateTime<Utc>,
    pub cost_coins: i32,
}

impl From<DueTaskEntity> for DueTask {
    fn from(entity: DueTaskEntity) -> Self {
        Self {
            user_task_id: entity.user_task_id,
            task_id: entity.task_id,
            group_id: entity.group_id,
            text: entity.text,
            description: entity.description,
            current_repetition: entity.current_repetition,
            max_repetitions: entity.max_repetitions,
            next_show_date: entity.next_show_date,
            cost_coins: entity.cost_coins,
            times_shown: entity.current_repetition - 1,
            is_from_shop: entity.cost_coins > 0,
        }
    }
}

/// An overdue pending user task with the creator of its task.
#[derive(Debug, Clone, FromRow)]
pub struct OverdueUserTaskEntity {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub current_repetition: i32,
    pub task_created_by: Uuid,
}
