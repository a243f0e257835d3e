//! Double-entry ledger logic.
//!
//! This module provides the pure side of the transaction journal: chart of
//! accounts rules, posting templates for domain events, and validation of
//! balanced compound journals. Persistence and idempotency enforcement live
//! in the repository layer.

pub mod accounts;
pub mod error;
pub mod posting;
pub mod template;

pub use accounts::{GlAccountType, balance_change, validate_parent};
pub use error::LedgerError;
pub use posting::{EntryAmounts, PostingService};
pub use template::{PostingEvent, TemplateLine, builtin_lines};
