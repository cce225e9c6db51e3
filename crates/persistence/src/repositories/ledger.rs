//! Ledger repository: group memberships and their coin balances.
//!
//! Balance changes are single `UPDATE ... SET coins = coins +/- $n`
//! statements so concurrent writers on one account never lose an update.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::GroupMembershipEntity;
use crate::metrics::QueryTimer;

/// Repository for membership and balance operations.
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user's membership in a group.
    pub async fn find_membership(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_membership");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT user_id, group_id, coins, joined_at
            FROM group_members
            WHERE user_id = $1 AND group_id = $2
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Current balance, or `None` when the user is not a member.
    pub async fn balance(&self, user_id: Uuid, group_id: Uuid) -> Result<Option<i32>, sqlx::Error> {
        Ok(self
            .find_membership(user_id, group_id)
            .await?
            .map(|m| m.coins))
    }

    /// Add a member with a starting balance.
    ///
    /// Returns `None` if the user is already a member.
    pub async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        starting_balance: i32,
    ) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("add_member");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            INSERT INTO group_members (user_id, group_id, coins)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, group_id) DO NOTHING
            RETURNING user_id, group_id, coins, joined_at
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .bind(starting_balance)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Remove a membership. Returns whether a row was deleted.
    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("remove_member");
        let result = sqlx::query("DELETE FROM group_members WHERE user_id = $1 AND group_id = $2")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Atomically add coins to an account.
    ///
    /// Returns the new balance, or `None` when the account does not exist.
    pub async fn credit(
        conn: &mut PgConnection,
        user_id: Uuid,
        group_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        let timer = QueryTimer::new("ledger_credit");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE group_members
            SET coins = coins + $3
            WHERE user_id = $1 AND group_id = $2
            RETURNING coins
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Atomically remove coins from an account if the balance covers them.
    ///
    /// Returns the new balance, or `None` when the account does not exist
    /// or holds less than `amount`. Nothing is changed in that case.
    pub async fn debit(
        conn: &mut PgConnection,
        user_id: Uuid,
        group_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        let timer = QueryTimer::new("ledger_debit");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE group_members
            SET coins = coins - $3
            WHERE user_id = $1 AND group_id = $2 AND coins >= $3
            RETURNING coins
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Balance read on the given connection, for use inside a transaction.
    pub async fn balance_on(
        conn: &mut PgConnection,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<Option<i32>, sqlx::Error> {
        let timer = QueryTimer::new("ledger_balance");
        let result = sqlx::query_scalar::<_, i32>(
            "SELECT coins FROM group_members WHERE user_id = $1 AND group_id = $2",
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
