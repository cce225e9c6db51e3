use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use domain::services::PushSender;
use shared::identity::{IdentityError, IdentityVerifier};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware};
use crate::routes::{cron, groups, health, push, shop, tasks, user_tasks};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub identity: Arc<IdentityVerifier>,
    /// Delivery capability used by reminders and test notifications
    pub push_sender: Arc<dyn PushSender>,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: PgPool,
        push_sender: Arc<dyn PushSender>,
    ) -> Result<Self, IdentityError> {
        let identity = IdentityVerifier::new(
            &config.identity.jwt_secret,
            config.identity.issuer.clone(),
            config.identity.leeway_secs,
        )?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            identity: Arc::new(identity),
            push_sender,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // User routes; handlers authenticate through the UserAuth extractor
    let user_routes = Router::new()
        // Groups and membership
        .route(
            "/api/v1/groups",
            post(groups::create_group).get(groups::list_groups),
        )
        .route(
            "/api/v1/groups/:group_id",
            get(groups::get_group).delete(groups::delete_group),
        )
        .route(
            "/api/v1/groups/:group_id/members",
            post(groups::invite_member),
        )
        .route("/api/v1/groups/:group_id/leave", post(groups::leave_group))
        // Task catalog and due lists
        .route(
            "/api/v1/groups/:group_id/tasks",
            post(tasks::create_task).get(tasks::list_tasks),
        )
        .route("/api/v1/groups/:group_id/tasks/today", get(tasks::due_today))
        .route(
            "/api/v1/groups/:group_id/tasks/pending",
            get(tasks::pending),
        )
        .route("/api/v1/tasks/:task_id", delete(tasks::delete_task))
        // Marketplace
        .route("/api/v1/groups/:group_id/shop", get(shop::list_shop))
        .route(
            "/api/v1/groups/:group_id/shop/:task_id/buy",
            post(shop::buy_task),
        )
        // Assignments
        .route(
            "/api/v1/user-tasks/:user_task_id",
            get(user_tasks::get_user_task),
        )
        .route(
            "/api/v1/user-tasks/:user_task_id/complete",
            post(user_tasks::complete),
        )
        .route(
            "/api/v1/user-tasks/:user_task_id/stats",
            get(user_tasks::stats),
        )
        .route(
            "/api/v1/user-tasks/:user_task_id/history",
            get(user_tasks::history),
        )
        // Push subscriptions
        .route(
            "/api/v1/push/subscriptions",
            post(push::subscribe)
                .get(push::list_subscriptions)
                .delete(push::unsubscribe),
        )
        .route("/api/v1/push/test", post(push::send_test));

    // External periodic trigger (shared secret)
    let cron_routes = Router::new()
        .route("/api/v1/cron/expire-overdue", post(cron::expire_overdue))
        .route("/api/v1/cron/send-reminders", post(cron::send_reminders));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(cron_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
