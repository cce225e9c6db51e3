use anyhow::Result;
use domain::services::{MockNotificationService, PushSender};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use pamatovacek_api::app::{create_app, AppState};
use pamatovacek_api::config::Config;
use pamatovacek_api::jobs::{ExpireOverdueJob, JobFrequency, JobScheduler, TaskRemindersJob};
use pamatovacek_api::middleware::{init_metrics, logging::init_logging};
use pamatovacek_api::services::{ExpirationSweeper, HttpPushSender, ReminderDispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_logging(&config.logging);
    init_metrics()?;

    info!("Starting Pamatovacek API v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let push_sender: Arc<dyn PushSender> = if config.push.enabled {
        Arc::new(HttpPushSender::new(config.push.timeout_ms)?)
    } else {
        info!("Push delivery disabled, reminders are only logged");
        Arc::new(MockNotificationService::new())
    };

    let mut scheduler = JobScheduler::new();
    if config.jobs.enabled {
        let offset = config.scheduler.timezone();
        scheduler.register(ExpireOverdueJob::new(
            ExpirationSweeper::new(pool.clone(), config.scheduler),
            JobFrequency::DailyAt {
                hour: config.jobs.expiration_hour,
                offset,
            },
        ));
        scheduler.register(TaskRemindersJob::new(
            ReminderDispatcher::new(pool.clone(), push_sender.clone(), config.scheduler),
            JobFrequency::DailyAt {
                hour: config.jobs.reminder_hour,
                offset,
            },
        ));
        scheduler.start();
    }

    let addr = config.socket_addr();
    let state = AppState::new(config, pool, push_sender)?;
    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}
