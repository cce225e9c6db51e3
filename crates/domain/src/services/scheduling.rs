//! Pure spaced-repetition rules.
//!
//! Nothing here touches storage. Repositories apply the outcome with a
//! conditional update so that a concurrent writer is detected.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Timelike, Utc};

use crate::errors::DomainError;
use crate::models::{IntervalSchedule, UserTask, UserTaskStatus};

/// The state an assignment moves to when one repetition is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// More repetitions remain; the assignment stays pending.
    Advanced {
        next_repetition: i32,
        next_show_date: DateTime<Utc>,
    },
    /// The last repetition was completed.
    Finished { final_repetition: i32 },
}

impl CompletionOutcome {
    pub fn repetition(&self) -> i32 {
        match self {
            CompletionOutcome::Advanced {
                next_repetition, ..
            } => *next_repetition,
            CompletionOutcome::Finished { final_repetition } => *final_repetition,
        }
    }

    pub fn status(&self) -> UserTaskStatus {
        match self {
            CompletionOutcome::Advanced { .. } => UserTaskStatus::Pending,
            CompletionOutcome::Finished { .. } => UserTaskStatus::Completed,
        }
    }

    pub fn next_show_date(&self) -> Option<DateTime<Utc>> {
        match self {
            CompletionOutcome::Advanced { next_show_date, .. } => Some(*next_show_date),
            CompletionOutcome::Finished { .. } => None,
        }
    }
}

/// Computes the transition for completing the current repetition at `now`.
///
/// Completing repetition `N` waits `schedule[N]` days before repetition
/// `N + 1`. The last repetition never consults the schedule.
///
/// The lookup is keyed by the repetition just completed, not the next one:
/// intervals `[1, 3, 7]` show a task on day 0, day 1 and day 4.
pub fn plan_completion(
    user_task: &UserTask,
    max_repetitions: i32,
    schedule: &IntervalSchedule,
    now: DateTime<Utc>,
) -> Result<CompletionOutcome, DomainError> {
    if user_task.status != UserTaskStatus::Pending {
        return Err(DomainError::Conflict(format!(
            "User task {} is already {}",
            user_task.id, user_task.status
        )));
    }

    let next_repetition = user_task.current_repetition + 1;
    if next_repetition > max_repetitions {
        return Ok(CompletionOutcome::Finished {
            final_repetition: next_repetition,
        });
    }

    let interval_days = schedule
        .interval_for(user_task.current_repetition)
        .ok_or_else(|| {
            DomainError::InternalInconsistency(format!(
                "Task {} has no interval for repetition {}",
                user_task.task_id, user_task.current_repetition
            ))
        })?;

    Ok(CompletionOutcome::Advanced {
        next_repetition,
        next_show_date: now + Duration::days(i64::from(interval_days)),
    })
}

/// The most recently passed daily cutoff at `deadline_hour` local time.
///
/// Before the cutoff hour the deadline rolls back to yesterday's cutoff.
pub fn expiration_deadline(
    now: DateTime<Utc>,
    deadline_hour: u32,
    offset: FixedOffset,
) -> DateTime<Utc> {
    let local = now.with_timezone(&offset);
    let mut date = local.date_naive();
    if local.hour() < deadline_hour {
        date = date.pred_opt().unwrap_or(date);
    }
    let cutoff = NaiveTime::from_hms_opt(deadline_hour.min(23), 0, 0).unwrap_or_default();
    local_to_utc(date.and_time(cutoff), offset)
}

/// The current local day as a half-open UTC range `[start, end)`.
pub fn reminder_window(
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = now.with_timezone(&offset).date_naive();
    let start = local_to_utc(date.and_time(NaiveTime::MIN), offset);
    (start, start + Duration::days(1))
}

fn local_to_utc(local: chrono::NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}
