//! Shop purchase request and response.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request payload for buying a shop task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BuyTaskRequest {
    /// Recipient of the new assignment; may be the buyer.
    pub assign_to_user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BuyTaskResponse {
    pub user_task_id: Uuid,
    pub cost_coins: i32,
    /// Buyer's balance after the debit.
    pub balance: i32,
}
