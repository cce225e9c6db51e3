//! Ledger: per-member coin balances.

use domain::models::GroupMembership;
use domain::DomainError;
use persistence::repositories::LedgerRepository;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::middleware::metrics::{record_coins_credited, record_coins_debited};

/// Atomic credit and debit of group member balances.
#[derive(Clone)]
pub struct LedgerService {
    pool: PgPool,
    repo: LedgerRepository,
}

impl LedgerService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: LedgerRepository::new(pool.clone()),
            pool,
        }
    }

    /// The user's membership, or `Forbidden` when they are not a member.
    pub async fn require_member(
        &self,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<GroupMembership, DomainError> {
        self.repo
            .find_membership(user_id, group_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| DomainError::Forbidden("Not a member of this group".to_string()))
    }

    pub async fn balance(&self, user_id: Uuid, group_id: Uuid) -> Result<i32, DomainError> {
        self.repo
            .balance(user_id, group_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Membership not found".to_string()))
    }

    /// Adds `amount` coins. Returns the new balance.
    pub async fn credit(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        amount: i32,
    ) -> Result<i32, DomainError> {
        if amount < 0 {
            return Err(DomainError::BadRequest(
                "Credit amount cannot be negative".to_string(),
            ));
        }

        let mut conn = self.pool.acquire().await?;
        let balance = LedgerRepository::credit(&mut conn, user_id, group_id, amount)
            .await?
            .ok_or_else(|| DomainError::NotFound("Membership not found".to_string()))?;
        record_coins_credited(amount);

        info!(user_id = %user_id, group_id = %group_id, amount, balance, "Coins credited");
        Ok(balance)
    }

    /// Removes `amount` coins if the balance covers them. Returns the new balance.
    pub async fn debit(
        &self,
        user_id: Uuid,
        group_id: Uuid,
        amount: i32,
    ) -> Result<i32, DomainError> {
        if amount < 0 {
            return Err(DomainError::BadRequest(
                "Debit amount cannot be negative".to_string(),
            ));
        }

        let mut conn = self.pool.acquire().await?;
        let balance = debit_or_reject(&mut conn, user_id, group_id, amount).await?;
        record_coins_debited(amount);

        info!(user_id = %user_id, group_id = %group_id, amount, balance, "Coins debited");
        Ok(balance)
    }
}

/// Conditional debit that explains a rejection.
///
/// Runs on the caller's connection so it can join a larger transaction.
pub(crate) async fn debit_or_reject(
    conn: &mut sqlx::PgConnection,
    user_id: Uuid,
    group_id: Uuid,
    amount: i32,
) -> Result<i32, DomainError> {
    if let Some(balance) = LedgerRepository::debit(conn, user_id, group_id, amount).await? {
        return Ok(balance);
    }

    match LedgerRepository::balance_on(conn, user_id, group_id).await? {
        Some(balance) => Err(DomainError::InsufficientFunds {
            balance,
            required: amount,
        }),
        None => Err(DomainError::NotFound("Membership not found".to_string())),
    }
}
