//! Task history repository.

use chrono::{DateTime, Utc};
use domain::models::HistoryOutcome;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{HistoryOutcomeDb, TaskHistoryEntity};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct TaskHistoryRepository {
    pool: PgPool,
}

impl TaskHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a history row inside the caller's transaction.
    pub async fn record(
        conn: &mut PgConnection,
        user_task_id: Uuid,
        repetition: i32,
        outcome: HistoryOutcome,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("record_task_history");
        let result = sqlx::query(
            r#"
            INSERT INTO task_history (user_task_id, repetition, outcome, recorded_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_task_id)
        .bind(repetition)
        .bind(HistoryOutcomeDb::from(outcome))
        .bind(recorded_at)
        .execute(&mut *conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// History of one assignment, oldest first.
    pub async fn find_by_user_task(
        &self,
        user_task_id: Uuid,
    ) -> Result<Vec<TaskHistoryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_task_history");
        let result = sqlx::query_as::<_, TaskHistoryEntity>(
            r#"
            SELECT id, user_task_id, repetition, outcome, recorded_at
            FROM task_history
            WHERE user_task_id = $1
            ORDER BY recorded_at, repetition, id
            "#,
        )
        .bind(user_task_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
