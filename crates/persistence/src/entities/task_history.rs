//! Task history entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{HistoryOutcome, TaskHistoryEntry};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for history_outcome that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "history_outcome", rename_all = "lowercase")]
pub enum HistoryOutcomeDb {
    Completed,
    Failed,
}

impl From<HistoryOutcomeDb> for HistoryOutcome {
    fn from(db: HistoryOutcomeDb) -> Self {
        match db {
            HistoryOutcomeDb::Completed => HistoryOutcome::Completed,
            HistoryOutcomeDb::Failed => HistoryOutcome::Failed,
        }
    }
}

impl From<HistoryOutcome> for HistoryOutcomeDb {
    fn from(outcome: HistoryOutcome) -> Self {
        match outcome {
            HistoryOutcome::Completed => HistoryOutcomeDb::Completed,
            HistoryOutcome::Failed => HistoryOutcomeDb::Failed,
        }
    }
}

/// Database row mapping for the task_history table.
#[derive(Debug, Clone, FromRow)]
pub struct TaskHistoryEntity {
    pub id: Uuid,
    pub user_task_id: Uuid,
    pub repetition: i32,
    pub outcome: HistoryOutcomeDb,
    pub recorded_at: DateTime<Utc>,
}

impl From<TaskHistoryEntity> for TaskHistoryEntry {
    fn from(entity: TaskHistoryEntity) -> Self {
        Self {
            id: entity.id,
            user_task_id: entity.user_task_id,
            repetition: entity.repetition,
            outcome: entity.outcome.into(),
            recorded_at: entity.recorded_at,
        }
    }
}
