//! Daily expiration of overdue assignments.

use chrono::Utc;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::services::ExpirationSweeper;

/// Runs the expiration sweep once a day.
pub struct ExpireOverdueJob {
    sweeper: ExpirationSweeper,
    frequency: JobFrequency,
}

impl ExpireOverdueJob {
    pub fn new(sweeper: ExpirationSweeper, frequency: JobFrequency) -> Self {
        Self { sweeper, frequency }
    }
}

#[async_trait::async_trait]
impl Job for ExpireOverdueJob {
    fn name(&self) -> &'static str {
        "expire_overdue"
    }

    fn frequency(&self) -> JobFrequency {
        self.frequency
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self
            .sweeper
            .expire_overdue(Utc::now())
            .await
            .map_err(|e| format!("Failed to expire overdue tasks: {}", e))?;

        info!(
            failed_count = summary.failed_count,
            errors = summary.errors,
            "Expired overdue user tasks"
        );
        Ok(())
    }
}
