//! Task definitions and their interval schedules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Largest number of repetitions a single task may require.
pub const MAX_REPETITIONS: i32 = 100;

/// Task kind, discriminated by the task's cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Free, assigned to every member when created.
    Learning,
    /// Paid, assigned only through a purchase.
    Shop,
}

impl TaskKind {
    pub fn from_cost(cost_coins: i32) -> Self {
        if cost_coins > 0 {
            TaskKind::Shop
        } else {
            TaskKind::Learning
        }
    }
}

/// A task definition owned by its creator within a group.
///
/// Tasks are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub text: String,
    pub description: Option<String>,
    pub max_repetitions: i32,
    pub cost_coins: i32,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        TaskKind::from_cost(self.cost_coins)
    }

    pub fn is_shop(&self) -> bool {
        self.kind() == TaskKind::Shop
    }
}

/// One entry of an interval schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskInterval {
    pub sequence_number: i32,
    pub interval_days: i32,
}

/// Ordered day offsets governing spaced repetition.
///
/// Entry `N` is the wait after completing repetition `N`, before
/// repetition `N + 1` is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSchedule {
    entries: Vec<TaskInterval>,
}

impl IntervalSchedule {
    /// Builds a schedule from stored entries, sorting by sequence number.
    pub fn new(mut entries: Vec<TaskInterval>) -> Self {
        entries.sort_by_key(|e| e.sequence_number);
        Self { entries }
    }

    /// Numbers a list of day offsets from 1.
    pub fn from_days(days: &[i32]) -> Self {
        let entries = days
            .iter()
            .zip(1..)
            .map(|(&interval_days, sequence_number)| TaskInterval {
                sequence_number,
                interval_days,
            })
            .collect();
        Self { entries }
    }

    pub fn interval_for(&self, sequence_number: i32) -> Option<i32> {
        self.entries
            .iter()
            .find(|e| e.sequence_number == sequence_number)
            .map(|e| e.interval_days)
    }

    pub fn entries(&self) -> &[TaskInterval] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TaskInterval> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A task together with its ordered interval schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskWithIntervals {
    #[serde(flatten)]
    pub task: Task,
    pub kind: TaskKind,
    pub intervals: Vec<TaskInterval>,
}

impl TaskWithIntervals {
    pub fn new(task: Task, intervals: Vec<TaskInterval>) -> Self {
        Self {
            kind: task.kind(),
            task,
            intervals,
        }
    }
}

/// A shop task annotated for the viewing member.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ShopTask {
    #[serde(flatten)]
    pub task: Task,
    pub can_afford: bool,
}

impl ShopTask {
    pub fn for_viewer(task: Task, viewer_balance: i32) -> Self {
        let can_afford = viewer_balance >= task.cost_coins;
        Self { task, can_afford }
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_schedule_covers_repetitions", skip_on_field_errors = true))]
pub struct CreateTaskRequest {
    #[validate(
        length(min = 1, max = 500, message = "Text must be between 1 and 500 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub text: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 100, message = "Max repetitions must be between 1 and 100"))]
    pub max_repetitions: i32,

    #[validate(custom(function = "shared::validation::validate_interval_days"))]
    pub intervals: Vec<i32>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Cost cannot be negative"))]
    pub cost_coins: i32,
}

/// Every repetition except the last needs a wait interval.
fn validate_schedule_covers_repetitions(
    request: &CreateTaskRequest,
) -> Result<(), ValidationError> {
    let required = usize::try_from(request.max_repetitions.saturating_sub(1)).unwrap_or(0);
    if request.intervals.len() < required {
        let mut err = ValidationError::new("schedule_too_short");
        err.message = Some("Intervals must cover every repetition before the last".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(max_repetitions: i32, intervals: Vec<i32>, cost_coins: i32) -> CreateTaskRequest {
        CreateTaskRequest {
            text: "Irregular verbs".to_string(),
            description: None,
            max_repetitions,
            intervals,
            cost_coins,
        }
    }

    #[test]
    fn test_kind_from_cost() {
        assert_eq!(TaskKind::from_cost(0), TaskKind::Learning);
        assert_eq!(TaskKind::from_cost(50), TaskKind::Shop);
    }

    #[test]
    fn test_schedule_from_days_is_one_based() {
        let schedule = IntervalSchedule::from_days(&[1, 3, 7]);
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.interval_for(1), Some(1));
        assert_eq!(schedule.interval_for(2), Some(3));
        assert_eq!(schedule.interval_for(3), Some(7));
        assert_eq!(schedule.interval_for(4), None);
        assert_eq!(schedule.interval_for(0), None);
    }

    #[test]
    fn test_schedule_new_sorts_entries() {
        let schedule = IntervalSchedule::new(vec![
            TaskInterval {
                sequence_number: 2,
                interval_days: 5,
            },
            TaskInterval {
                sequence_number: 1,
                interval_days: 2,
            },
        ]);
        assert_eq!(schedule.entries()[0].sequence_number, 1);
        assert_eq!(schedule.interval_for(2), Some(5));
    }

    #[test]
    fn test_create_task_request_validation() {
        assert!(request(3, vec![1, 3, 7], 0).validate().is_ok());
        assert!(request(3, vec![1, 3], 0).validate().is_ok());
        assert!(request(1, vec![0], 25).validate().is_ok());

        assert!(request(0, vec![1], 0).validate().is_err());
        assert!(request(3, vec![], 0).validate().is_err());
        assert!(request(3, vec![-1, 2], 0).validate().is_err());
        assert!(request(1, vec![1], -5).validate().is_err());
    }

    #[test]
    fn test_create_task_request_schedule_too_short() {
        let errors = request(4, vec![1, 3], 0).validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn test_shop_task_can_afford() {
        let task = Task {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            text: "Wash dishes".to_string(),
            description: None,
            max_repetitions: 1,
            cost_coins: 50,
            created_at: Utc::now(),
        };
        assert!(ShopTask::for_viewer(task.clone(), 50).can_afford);
        assert!(!ShopTask::for_viewer(task, 49).can_afford);
    }
}
