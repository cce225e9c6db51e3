//! Repository implementations for database operations.

pub mod group;
pub mod ledger;
pub mod push_subscription;
pub mod task;
pub mod task_history;
pub mod user_task;

pub use group::GroupRepository;
pub use ledger::LedgerRepository;
pub use push_subscription::PushSubscriptionRepository;
pub use task::{NewTask, TaskRepository};
pub use task_history::TaskHistoryRepository;
pub use user_task::UserTaskRepository;
