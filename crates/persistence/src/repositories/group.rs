//! Group repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupEntity, GroupMembershipEntity, GroupSummaryEntity};
use crate::metrics::QueryTimer;

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new group and add the creator as its first member.
    pub async fn create_group(
        &self,
        name: &str,
        created_by: Uuid,
        starting_balance: i32,
    ) -> Result<GroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_group");

        // Group and creator membership are created atomically
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, GroupEntity>(
            r#"
            INSERT INTO groups (name, created_by)
            VALUES ($1, $2)
            RETURNING id, name, created_by, created_at
            "#,
        )
        .bind(name)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO group_members (user_id, group_id, coins)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(created_by)
        .bind(group.id)
        .bind(starting_balance)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(group)
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, created_by, created_at
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find all groups a user belongs to, with their balance in each.
    pub async fn find_user_groups(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GroupSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_groups");
        let result = sqlx::query_as::<_, GroupSummaryEntity>(
            r#"
            SELECT
                g.id, g.name, g.created_by, g.created_at,
                gm.coins AS my_coins,
                (SELECT COUNT(*) FROM group_members WHERE group_id = g.id) AS member_count
            FROM groups g
            JOIN group_members gm ON g.id = gm.group_id
            WHERE gm.user_id = $1
            ORDER BY gm.joined_at DESC, g.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List the members of a group, oldest first.
    pub async fn find_members(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_members");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT user_id, group_id, coins, joined_at
            FROM group_members
            WHERE group_id = $1
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a group. Members, tasks, assignments and history cascade.
    pub async fn delete_group(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_group");
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
