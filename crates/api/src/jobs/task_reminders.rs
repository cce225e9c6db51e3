//! Daily push reminders.

use chrono::Utc;

use super::scheduler::{Job, JobFrequency};
use crate::services::ReminderDispatcher;

/// Sends the daily reminders once a day.
pub struct TaskRemindersJob {
    dispatcher: ReminderDispatcher,
    frequency: JobFrequency,
}

impl TaskRemindersJob {
    pub fn new(dispatcher: ReminderDispatcher, frequency: JobFrequency) -> Self {
        Self {
            dispatcher,
            frequency,
        }
    }
}

#[async_trait::async_trait]
impl Job for TaskRemindersJob {
    fn name(&self) -> &'static str {
        "task_reminders"
    }

    fn frequency(&self) -> JobFrequency {
        self.frequency
    }

    async fn execute(&self) -> Result<(), String> {
        self.dispatcher
            .send_daily_reminders(Utc::now())
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to send reminders: {}", e))
    }
}
