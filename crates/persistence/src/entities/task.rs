//! Task and interval entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Task, TaskInterval};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the tasks table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub text: String,
    pub description: Option<String>,
    pub max_repetitions: i32,
    pub cost_coins: i32,
    pub created_at: DateTime<Utc>,
}

impl From<TaskEntity> for Task {
    fn from(entity: TaskEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            created_by: entity.created_by,
            text: entity.text,
            description: entity.description,
            max_repetitions: entity.max_repetitions,
            cost_coins: entity.cost_coins,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the task_intervals table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskIntervalEntity {
    pub task_id: Uuid,
    pub sequence_number: i32,
    pub interval_days: i32,
}

impl From<TaskIntervalEntity> for TaskInterval {
    fn from(entity: TaskIntervalEntity) -> Self {
        Self {
            sequence_number: entity.sequence_number,
            interval_days: entity.interval_days,
        }
    }
}
