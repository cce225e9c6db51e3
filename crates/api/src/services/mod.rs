//! Engine services.
//!
//! Each service owns its repositories and returns [`domain::DomainError`].

pub mod catalog;
pub mod expiration;
pub mod groups;
pub mod ledger;
pub mod marketplace;
pub mod push;
pub mod reminders;
pub mod scheduler;

pub use catalog::TaskCatalogService;
pub use expiration::ExpirationSweeper;
pub use groups::GroupService;
pub use ledger::LedgerService;
pub use marketplace::MarketplaceService;
pub use push::{HttpPushSender, PushSubscriptionService};
pub use reminders::ReminderDispatcher;
pub use scheduler::RepetitionScheduler;
