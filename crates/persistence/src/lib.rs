//! Persistence layer for the Pamatovacek backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//!
//! Ledger and state-transition writes are single conditional statements.
//! Repository functions that take a `&mut PgConnection` are meant to run
//! inside a caller-owned transaction.

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
