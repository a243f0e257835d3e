//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by ledger validation and template resolution.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A posting needs at least two lines.
    #[error("a journal requires at least 2 entries")]
    InsufficientEntries,

    /// Entry amount is zero.
    #[error("entry amount must be non-zero")]
    ZeroAmount,

    /// Entry amount is negative.
    #[error("entry amount must be positive")]
    NegativeAmount,

    /// An entry must be either a debit or a credit, never both.
    #[error("entry must set exactly one of debit or credit")]
    MixedEntry,

    /// Total debits do not equal total credits.
    #[error("unbalanced journal: debits {debit} != credits {credit}")]
    UnbalancedJournal {
        /// Sum of debit amounts.
        debit: Decimal,
        /// Sum of credit amounts.
        credit: Decimal,
    },

    /// No template or built-in mapping exists for the event code.
    #[error("no posting template for event: {0}")]
    UnknownEvent(String),

    /// A template references a GL account code that does not exist.
    #[error("unknown GL account code: {0}")]
    UnknownAccountCode(String),

    /// Parent assignment violates the chart-of-accounts rules.
    #[error("invalid parent account: {0}")]
    InvalidParent(String),
}
