//! Push subscription repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PushSubscriptionEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PushSubscriptionRepository {
    pool: PgPool,
}

impl PushSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register an endpoint for a user. Re-registering an endpoint replaces
    /// its keys and owner.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        endpoint: &str,
        p256dh: &str,
        auth: &str,
    ) -> Result<PushSubscriptionEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_push_subscription");
        let result = sqlx::query_as::<_, PushSubscriptionEntity>(
            r#"
            INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (endpoint) DO UPDATE
            SET user_id = EXCLUDED.user_id, p256dh = EXCLUDED.p256dh, auth = EXCLUDED.auth
            RETURNING id, user_id, endpoint, p256dh, auth, created_at
            "#,
        )
        .bind(user_id)
        .bind(endpoint)
        .bind(p256dh)
        .bind(auth)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Remove a user's endpoint. Returns whether a row was deleted.
    pub async fn delete_for_user(&self, user_id: Uuid, endpoint: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_push_subscription_for_user");
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE user_id = $1 AND endpoint = $2")
            .bind(user_id)
            .bind(endpoint)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Remove an endpoint regardless of owner.
    pub async fn delete_by_endpoint(&self, endpoint: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_push_subscription");
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    pub async fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PushSubscriptionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_push_subscriptions_by_user");
        let result = sqlx::query_as::<_, PushSubscriptionEntity>(
            r#"
            SELECT id, user_id, endpoint, p256dh, auth, created_at
            FROM push_subscriptions
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
