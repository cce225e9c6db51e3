//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod group;
pub mod push_subscription;
pub mod task;
pub mod task_history;
pub mod user_task;

pub use group::{GroupEntity, GroupMembershipEntity, GroupSummaryEntity};
pub use push_subscription::PushSubscriptionEntity;
pub use task::{TaskEntity, TaskIntervalEntity};
pub use task_history::{HistoryOutcomeDb, TaskHistoryEntity};
pub use user_task::{DueTaskEntity, OverdueUserTaskEntity, UserTaskEntity, UserTaskStatusDb};
