//! Domain layer for the Pamatovacek backend.
//!
//! This crate contains:
//! - Domain models (Group, Task, UserTask, push subscriptions)
//! - Scheduler configuration and the domain error taxonomy
//! - Pure scheduling rules and the push notification capability

pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use config::SchedulerConfig;
pub use errors::DomainError;
