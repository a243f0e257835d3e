//! Bulk-batch CSV archival via Apache OpenDAL.
//!
//! Archival is a post-commit collaborator: a failed upload is logged and
//! surfaced as an informational field, never as an operation failure.

pub mod config;
pub mod error;
pub mod service;

pub use config::StorageProvider;
pub use error::StorageError;
pub use service::ArchiveStore;
