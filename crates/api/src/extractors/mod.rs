//! Custom Axum extractors.

pub mod cron_auth;
pub mod user_auth;

pub use cron_auth::CronAuth;
pub use user_auth::UserAuth;
