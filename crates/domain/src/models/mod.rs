//! Domain models for Pamatovacek.

pub mod batch;
pub mod group;
pub mod marketplace;
pub mod push;
pub mod task;
pub mod user_task;

pub use batch::{ExpirationSummary, ReminderSummary};
pub use group::{
    CreateGroupRequest, Group, GroupDetails, GroupMembership, GroupSummary, InviteMemberRequest,
};
pub use marketplace::{BuyTaskRequest, BuyTaskResponse};
pub use push::{PushSubscription, SubscribeRequest, TestNotificationResponse, UnsubscribeRequest};
pub use task::{
    CreateTaskRequest, IntervalSchedule, ShopTask, Task, TaskInterval, TaskKind,
    TaskWithIntervals,
};
pub use user_task::{
    CompleteTaskResponse, DueTask, HistoryOutcome, TaskHistoryEntry, TaskStats, UserTask,
    UserTaskDetails, UserTaskStatus,
};
