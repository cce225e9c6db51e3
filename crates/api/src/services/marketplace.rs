//! Marketplace: spending coins to assign shop tasks.

use chrono::{DateTime, Utc};
use domain::models::BuyTaskResponse;
use domain::DomainError;
use persistence::repositories::{LedgerRepository, TaskRepository, UserTaskRepository};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ledger::{debit_or_reject, LedgerService};
use crate::middleware::metrics::{record_coins_debited, record_shop_task_purchased};

#[derive(Clone)]
pub struct MarketplaceService {
    pool: PgPool,
    tasks: TaskRepository,
    ledger: LedgerService,
}

impl MarketplaceService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tasks: TaskRepository::new(pool.clone()),
            ledger: LedgerService::new(pool.clone()),
            pool,
        }
    }

    /// Buys a shop task and assigns it to `assign_to` (possibly the buyer).
    ///
    /// The debit and the new assignment commit together; an insufficient
    /// balance leaves both untouched. Buying again creates another,
    /// independent assignment.
    pub async fn buy_task(
        &self,
        task_id: Uuid,
        group_id: Uuid,
        buyer_id: Uuid,
        assign_to: Uuid,
        now: DateTime<Utc>,
    ) -> Result<BuyTaskResponse, DomainError> {
        self.ledger.require_member(buyer_id, group_id).await?;

        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .filter(|t| t.group_id == group_id)
            .ok_or_else(|| DomainError::NotFound("Task not found".to_string()))?;
        if task.cost_coins <= 0 {
            return Err(DomainError::BadRequest(
                "Task is not available in the shop".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        if LedgerRepository::balance_on(&mut tx, assign_to, group_id)
            .await?
            .is_none()
        {
            return Err(DomainError::BadRequest(
                "Recipient is not a member of this group".to_string(),
            ));
        }

        let balance = debit_or_reject(&mut tx, buyer_id, group_id, task.cost_coins).await?;
        let user_task =
            UserTaskRepository::insert(&mut tx, task.id, assign_to, group_id, now).await?;
        tx.commit().await?;

        record_shop_task_purchased();
        record_coins_debited(task.cost_coins);
        info!(
            task_id = %task.id,
            group_id = %group_id,
            buyer_id = %buyer_id,
            assign_to = %assign_to,
            cost_coins = task.cost_coins,
            balance,
            "Shop task purchased"
        );

        Ok(BuyTaskResponse {
            user_task_id: user_task.id,
            cost_coins: task.cost_coins,
            balance,
        })
    }
}
