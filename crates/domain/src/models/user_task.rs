//! Assignment models: the mutable scheduling unit of a task for one user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::task::{Task, TaskInterval};

/// Status of an assignment. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTaskStatus {
    Pending,
    Completed,
    Failed,
}

impl UserTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserTaskStatus::Pending => "pending",
            UserTaskStatus::Completed => "completed",
            UserTaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, UserTaskStatus::Pending)
    }
}

impl FromStr for UserTaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(UserTaskStatus::Pending),
            "completed" => Ok(UserTaskStatus::Completed),
            "failed" => Ok(UserTaskStatus::Failed),
            _ => Err(format!("Invalid user task status: {}", s)),
        }
    }
}

impl fmt::Display for UserTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concrete scheduled instance of a task assigned to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserTask {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub current_repetition: i32,
    pub next_show_date: DateTime<Utc>,
    pub last_shown_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: UserTaskStatus,
    pub created_at: DateTime<Utc>,
}

impl UserTask {
    pub fn is_pending(&self) -> bool {
        self.status == UserTaskStatus::Pending
    }

    /// Due when pending and the next-show date has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.next_show_date <= now
    }

    pub fn times_shown(&self) -> i32 {
        self.current_repetition - 1
    }
}

/// A pending assignment joined with its task, as shown in task lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DueTask {
    pub user_task_id: Uuid,
    pub task_id: Uuid,
    pub group_id: Uuid,
    pub text: String,
    pub description: Option<String>,
    pub current_repetition: i32,
    pub max_repetitions: i32,
    pub next_show_date: DateTime<Utc>,
    pub cost_coins: i32,
    pub times_shown: i32,
    pub is_from_shop: bool,
}

/// Progress summary of one assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskStats {
    pub user_task_id: Uuid,
    pub times_shown: i32,
    pub next_show_date: DateTime<Utc>,
    pub current_repetition: i32,
    pub max_repetitions: i32,
    pub status: UserTaskStatus,
}

impl TaskStats {
    pub fn new(user_task: &UserTask, max_repetitions: i32) -> Self {
        Self {
            user_task_id: user_task.id,
            times_shown: user_task.times_shown(),
            next_show_date: user_task.next_show_date,
            current_repetition: user_task.current_repetition,
            max_repetitions,
            status: user_task.status,
        }
    }
}

/// An assignment with its task definition and schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UserTaskDetails {
    #[serde(flatten)]
    pub user_task: UserTask,
    pub task: Task,
    pub intervals: Vec<TaskInterval>,
}

/// Result of completing one repetition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CompleteTaskResponse {
    pub user_task_id: Uuid,
    pub coins_earned: i32,
    pub status: UserTaskStatus,
    pub current_repetition: i32,
    /// Present while the assignment stays pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_show_date: Option<DateTime<Utc>>,
}

/// Outcome recorded in an assignment's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryOutcome {
    Completed,
    Failed,
}

impl HistoryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryOutcome::Completed => "completed",
            HistoryOutcome::Failed => "failed",
        }
    }
}

impl FromStr for HistoryOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(HistoryOutcome::Completed),
            "failed" => Ok(HistoryOutcome::Failed),
            _ => Err(format!("Invalid history outcome: {}", s)),
        }
    }
}

/// One recorded completion or failure of an assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskHistoryEntry {
    pub id: Uuid,
    pub user_task_id: Uuid,
    pub repetition: i32,
    pub outcome: HistoryOutcome,
    pub recorded_at: DateTime<Utc>,
}
