//! HTTP route handlers.
//!
//! Handlers stay thin: authenticate, validate, call an engine service.

use serde::Serialize;

pub mod cron;
pub mod groups;
pub mod health;
pub mod push;
pub mod shop;
pub mod tasks;
pub mod user_tasks;

/// List envelope shared by collection endpoints.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}
