//! Shared utilities for the Pamatovacek backend.
//!
//! This crate provides functionality used across the other crates:
//! - Verification of identity tokens issued by the identity provider
//! - Common request validation helpers

pub mod identity;
pub mod validation;
