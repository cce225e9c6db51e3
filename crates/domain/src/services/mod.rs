//! Domain services for Pamatovacek.
//!
//! Pure scheduling rules and the push delivery capability.

pub mod notification;
pub mod scheduling;

pub use notification::{MockNotificationService, NotificationResult, PushMessage, PushSender};
pub use scheduling::{expiration_deadline, plan_completion, reminder_window, CompletionOutcome};
