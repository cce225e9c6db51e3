//! Summaries returned by the periodic batch operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one expiration sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpirationSummary {
    pub failed_count: usize,
    pub processed_at: DateTime<Utc>,
    /// Cutoff instant used for this run.
    pub deadline: DateTime<Utc>,
    /// Items skipped because of a per-item error.
    pub errors: usize,
}

/// Result of one reminder dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReminderSummary {
    pub users_notified: usize,
    pub sent: usize,
    pub failed: usize,
    pub removed_subscriptions: usize,
    /// Storage errors on a user's subscriptions; those items were skipped.
    pub errors: usize,
}
