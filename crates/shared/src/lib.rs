//! Shared types, errors, and configuration for Tamarind.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Outbound mail collaborator

pub mod config;
pub mod email;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
