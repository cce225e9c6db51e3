//! Background job scheduler and job implementations.

mod expire_overdue;
mod scheduler;
mod task_reminders;

pub use expire_overdue::ExpireOverdueJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use task_reminders::TaskRemindersJob;
