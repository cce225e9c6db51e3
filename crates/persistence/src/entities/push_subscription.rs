//! Push subscription entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the push_subscriptions table.
#[derive(Debug, Clone, FromRow)]
pub struct PushSubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

impl From<PushSubscriptionEntity> for domain::models::PushSubscription {
    fn from(entity: PushSubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            endpoint: entity.endpoint,
            p256dh: entity.p256dh,
            auth: entity.auth,
            created_at: entity.created_at,
        }
    }
}
