//! Guarantee rule error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::request::GuaranteeStatus;

/// Errors raised by guarantee capacity and request rules.
#[derive(Debug, Error)]
pub enum GuaranteeError {
    /// Guaranteed amounts must be positive.
    #[error("guaranteed amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The amount exceeds the guarantor's free capacity.
    #[error("amount {amount} exceeds available capacity {available}")]
    ExceedsCapacity {
        /// Requested amount.
        amount: Decimal,
        /// Capacity remaining on the profile.
        available: Decimal,
    },

    /// Committing would push the profile over its capacity ceiling.
    #[error("commitment of {amount} would exceed capacity: {committed} committed of {max}")]
    CommitmentOverflow {
        /// Amount being committed.
        amount: Decimal,
        /// Already committed.
        committed: Decimal,
        /// Capacity ceiling.
        max: Decimal,
    },

    /// The guarantor is not eligible to guarantee loans.
    #[error("guarantor is not eligible")]
    NotEligible,

    /// The request transition is not permitted.
    #[error("cannot move guarantee request from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: GuaranteeStatus,
        /// Requested status.
        to: GuaranteeStatus,
    },

    /// A request already exists for this (application, guarantor) pair.
    #[error("a guarantee request already exists for this guarantor")]
    Duplicate,

    /// Requests may only be created or answered before submission.
    #[error("application is {0} and no longer accepts guarantee changes")]
    ApplicationNotOpen(String),
}
