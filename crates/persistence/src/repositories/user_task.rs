//! User task repository: assignment state and its transitions.
//!
//! Every transition is guarded by `status = 'pending'` (and, for
//! completions, the expected repetition) in the same statement, so a
//! second concurrent writer affects zero rows.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{DueTaskEntity, OverdueUserTaskEntity, UserTaskEntity};
use crate::metrics::QueryTimer;

const USER_TASK_COLUMNS: &str = "id, task_id, user_id, group_id, current_repetition, \
     next_show_date, last_shown_at, completed_at, status, created_at";

const DUE_TASK_SELECT: &str = r#"
    SELECT
        ut.id AS user_task_id, ut.user_id, ut.task_id, ut.group_id,
        t.text, t.description, ut.current_repetition, t.max_repetitions,
        ut.next_show_date, t.cost_coins
    FROM user_tasks ut
    JOIN tasks t ON t.id = ut.task_id
"#;

/// Repository for user task operations.
#[derive(Clone)]
pub struct UserTaskRepository {
    pool: PgPool,
}

impl UserTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assign a task to every current member of the group.
    ///
    /// Membership is read by the same statement, so the fan-out is a
    /// consistent snapshot. Returns the number of assignments created.
    pub async fn fan_out(
        conn: &mut PgConnection,
        task_id: Uuid,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("fan_out_user_tasks");
        let result = sqlx::query(
            r#"
            INSERT INTO user_tasks (task_id, user_id, group_id, current_repetition, next_show_date)
            SELECT $1, gm.user_id, gm.group_id, 1, $3
            FROM group_members gm
            WHERE gm.group_id = $2
            "#,
        )
        .bind(task_id)
        .bind(group_id)
        .bind(now)
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Create one fresh assignment starting at repetition 1.
    pub async fn insert(
        conn: &mut PgConnection,
        task_id: Uuid,
        user_id: Uuid,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<UserTaskEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_user_task");
        let query = format!(
            r#"
            INSERT INTO user_tasks (task_id, user_id, group_id, current_repetition, next_show_date)
            VALUES ($1, $2, $3, 1, $4)
            RETURNING {USER_TASK_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, UserTaskEntity>(&query)
            .bind(task_id)
            .bind(user_id)
            .bind(group_id)
            .bind(now)
            .fetch_one(&mut *conn)
            .await;
        timer.record();
        result
    }

    /// Find a user task by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserTaskEntity>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_on(&mut conn, id).await
    }

    pub async fn find_by_id_on(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<UserTaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_task_by_id");
        let query = format!("SELECT {USER_TASK_COLUMNS} FROM user_tasks WHERE id = $1");
        let result = sqlx::query_as::<_, UserTaskEntity>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await;
        timer.record();
        result
    }

    /// Pending tasks of a user in a group that are due at `now`, earliest first.
    pub async fn find_due(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<DueTaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_due_tasks");
        let query = format!(
            "{DUE_TASK_SELECT} \
             WHERE ut.user_id = $1 AND ut.group_id = $2 \
               AND ut.status = 'pending' AND ut.next_show_date <= $3 \
             ORDER BY ut.next_show_date, ut.id"
        );
        let result = sqlx::query_as::<_, DueTaskEntity>(&query)
            .bind(user_id)
            .bind(group_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// All pending tasks of a user in a group, due or not.
    pub async fn find_pending(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<Vec<DueTaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_pending_tasks");
        let query = format!(
            "{DUE_TASK_SELECT} \
             WHERE ut.user_id = $1 AND ut.group_id = $2 AND ut.status = 'pending' \
             ORDER BY ut.next_show_date, ut.id"
        );
        let result = sqlx::query_as::<_, DueTaskEntity>(&query)
            .bind(user_id)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Pending tasks of all users shown within `[start, end)`, grouped by user.
    pub async fn find_pending_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DueTaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_pending_between");
        let query = format!(
            "{DUE_TASK_SELECT} \
             WHERE ut.status = 'pending' \
               AND ut.next_show_date >= $1 AND ut.next_show_date < $2 \
             ORDER BY ut.user_id, ut.next_show_date, ut.id"
        );
        let result = sqlx::query_as::<_, DueTaskEntity>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Pending tasks whose next-show date is at or before `deadline`.
    ///
    /// Assignments whose task was deleted are not returned.
    pub async fn find_overdue(
        &self,
        deadline: DateTime<Utc>,
    ) -> Result<Vec<OverdueUserTaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_overdue_user_tasks");
        let result = sqlx::query_as::<_, OverdueUserTaskEntity>(
            r#"
            SELECT ut.id, ut.task_id, ut.user_id, ut.group_id, ut.current_repetition,
                   t.created_by AS task_created_by
            FROM user_tasks ut
            JOIN tasks t ON t.id = ut.task_id
            WHERE ut.status = 'pending' AND ut.next_show_date <= $1
            ORDER BY ut.next_show_date, ut.id
            "#,
        )
        .bind(deadline)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Move a pending task to its next repetition.
    ///
    /// Returns the number of rows changed: zero when the task is no longer
    /// pending at `expected_repetition`.
    pub async fn advance(
        conn: &mut PgConnection,
        id: Uuid,
        expected_repetition: i32,
        next_repetition: i32,
        next_show_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("advance_user_task");
        let result = sqlx::query(
            r#"
            UPDATE user_tasks
            SET current_repetition = $3, next_show_date = $4, last_shown_at = $5
            WHERE id = $1 AND status = 'pending' AND current_repetition = $2
            "#,
        )
        .bind(id)
        .bind(expected_repetition)
        .bind(next_repetition)
        .bind(next_show_date)
        .bind(now)
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Mark a pending task completed after its last repetition.
    pub async fn finish(
        conn: &mut PgConnection,
        id: Uuid,
        expected_repetition: i32,
        final_repetition: i32,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("finish_user_task");
        let result = sqlx::query(
            r#"
            UPDATE user_tasks
            SET status = 'completed', current_repetition = $3, completed_at = $4, last_shown_at = $4
            WHERE id = $1 AND status = 'pending' AND current_repetition = $2
            "#,
        )
        .bind(id)
        .bind(expected_repetition)
        .bind(final_repetition)
        .bind(now)
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Fail a task that is still pending and still overdue at `deadline`.
    pub async fn fail_overdue(
        conn: &mut PgConnection,
        id: Uuid,
        deadline: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("fail_overdue_user_task");
        let result = sqlx::query(
            r#"
            UPDATE user_tasks
            SET status = 'failed'
            WHERE id = $1 AND status = 'pending' AND next_show_date <= $2
            "#,
        )
        .bind(id)
        .bind(deadline)
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
