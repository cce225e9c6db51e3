//! Task repository for database operations.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{TaskEntity, TaskIntervalEntity};
use crate::metrics::QueryTimer;

const TASK_COLUMNS: &str =
    "id, group_id, created_by, text, description, max_repetitions, cost_coins, created_at";

/// Fields of a new task row.
#[derive(Debug, Clone)]
pub struct NewTask<'a> {
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub text: &'a str,
    pub description: Option<&'a str>,
    pub max_repetitions: i32,
    pub cost_coins: i32,
}

/// Repository for task definitions and interval schedules.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a task row.
    pub async fn insert(
        conn: &mut PgConnection,
        task: &NewTask<'_>,
    ) -> Result<TaskEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_task");
        let query = format!(
            r#"
            INSERT INTO tasks (group_id, created_by, text, description, max_repetitions, cost_coins)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, TaskEntity>(&query)
            .bind(task.group_id)
            .bind(task.created_by)
            .bind(task.text)
            .bind(task.description)
            .bind(task.max_repetitions)
            .bind(task.cost_coins)
            .fetch_one(&mut *conn)
            .await;
        timer.record();
        result
    }

    /// Insert an interval schedule, numbering entries from 1 in list order.
    pub async fn insert_intervals(
        conn: &mut PgConnection,
        task_id: Uuid,
        interval_days: &[i32],
    ) -> Result<Vec<TaskIntervalEntity>, sqlx::Error> {
        let timer = QueryTimer::new("insert_task_intervals");
        let result = sqlx::query_as::<_, TaskIntervalEntity>(
            r#"
            INSERT INTO task_intervals (task_id, sequence_number, interval_days)
            SELECT $1, ord::INTEGER, days
            FROM UNNEST($2::INTEGER[]) WITH ORDINALITY AS t(days, ord)
            RETURNING task_id, sequence_number, interval_days
            "#,
        )
        .bind(task_id)
        .bind(interval_days)
        .fetch_all(&mut *conn)
        .await;
        timer.record();

        let mut rows = result?;
        rows.sort_by_key(|r| r.sequence_number);
        Ok(rows)
    }

    /// Find a task by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TaskEntity>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_on(&mut conn, id).await
    }

    /// Find a task by ID on the given connection.
    pub async fn find_by_id_on(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_task_by_id");
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let result = sqlx::query_as::<_, TaskEntity>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await;
        timer.record();
        result
    }

    /// Interval schedule of a task, ordered by sequence number.
    pub async fn find_intervals(
        &self,
        task_id: Uuid,
    ) -> Result<Vec<TaskIntervalEntity>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        Self::find_intervals_on(&mut conn, task_id).await
    }

    pub async fn find_intervals_on(
        conn: &mut PgConnection,
        task_id: Uuid,
    ) -> Result<Vec<TaskIntervalEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_task_intervals");
        let result = sqlx::query_as::<_, TaskIntervalEntity>(
            r#"
            SELECT task_id, sequence_number, interval_days
            FROM task_intervals
            WHERE task_id = $1
            ORDER BY sequence_number
            "#,
        )
        .bind(task_id)
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Interval schedules of several tasks, ordered by task then sequence.
    pub async fn find_intervals_for_tasks(
        &self,
        task_ids: &[Uuid],
    ) -> Result<Vec<TaskIntervalEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_intervals_for_tasks");
        let result = sqlx::query_as::<_, TaskIntervalEntity>(
            r#"
            SELECT task_id, sequence_number, interval_days
            FROM task_intervals
            WHERE task_id = ANY($1)
            ORDER BY task_id, sequence_number
            "#,
        )
        .bind(task_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All tasks of a group, newest first.
    pub async fn find_group_tasks(&self, group_id: Uuid) -> Result<Vec<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_tasks");
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE group_id = $1 ORDER BY created_at DESC, id"
        );
        let result = sqlx::query_as::<_, TaskEntity>(&query)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Shop tasks (cost above zero) of a group, newest first.
    pub async fn find_shop_tasks(&self, group_id: Uuid) -> Result<Vec<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_shop_tasks");
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE group_id = $1 AND cost_coins > 0 \
             ORDER BY created_at DESC, id"
        );
        let result = sqlx::query_as::<_, TaskEntity>(&query)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Delete a task. Its intervals cascade; assignments are kept.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_task");
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
