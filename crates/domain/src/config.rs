//! Tunable values of the coin economy and the daily deadline.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

pub const DEFAULT_COMPLETION_REWARD: i32 = 10;
pub const DEFAULT_FAILURE_PENALTY: i32 = 10;
pub const DEFAULT_DEADLINE_HOUR: u32 = 4;
pub const DEFAULT_STARTING_BALANCE: i32 = 100;

/// Largest UTC offset accepted for the scheduler's local day (14 hours).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Injected scheduler configuration.
///
/// All amounts are in coins. `deadline_hour` and the reminder window are
/// interpreted in the local time given by `utc_offset_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Coins credited to the assignee for every completion.
    #[serde(default = "default_completion_reward")]
    pub completion_reward: i32,

    /// Coins credited to the task creator when an assignment expires.
    #[serde(default = "default_failure_penalty")]
    pub failure_penalty: i32,

    /// Local hour of day at which pending assignments become overdue.
    #[serde(default = "default_deadline_hour")]
    pub deadline_hour: u32,

    /// Balance of a freshly created membership.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: i32,

    /// Offset of the local day from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_completion_reward() -> i32 {
    DEFAULT_COMPLETION_REWARD
}
fn default_failure_penalty() -> i32 {
    DEFAULT_FAILURE_PENALTY
}
fn default_deadline_hour() -> u32 {
    DEFAULT_DEADLINE_HOUR
}
fn default_starting_balance() -> i32 {
    DEFAULT_STARTING_BALANCE
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            completion_reward: DEFAULT_COMPLETION_REWARD,
            failure_penalty: DEFAULT_FAILURE_PENALTY,
            deadline_hour: DEFAULT_DEADLINE_HOUR,
            starting_balance: DEFAULT_STARTING_BALANCE,
            utc_offset_minutes: 0,
        }
    }
}

impl SchedulerConfig {
    /// The fixed offset of the scheduler's local day.
    ///
    /// Falls back to UTC for offsets that `validate` would reject.
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Checks that the values describe a usable economy.
    pub fn validate(&self) -> Result<(), String> {
        if self.completion_reward < 0 {
            return Err("completion_reward cannot be negative".to_string());
        }
        if self.failure_penalty < 0 {
            return Err("failure_penalty cannot be negative".to_string());
        }
        if self.starting_balance < 0 {
            return Err("starting_balance cannot be negative".to_string());
        }
        if self.deadline_hour >= 24 {
            return Err("deadline_hour must be between 0 and 23".to_string());
        }
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err("utc_offset_minutes must be within +/- 14 hours".to_string());
        }
        Ok(())
    }
}
