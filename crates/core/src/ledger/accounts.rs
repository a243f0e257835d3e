//! Chart-of-accounts rules.
//!
//! GL accounts form a tree per account type. The normal-balance direction
//! derives from the type and drives both balance aggregation and report
//! signs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;

/// GL account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlAccountType {
    /// Resources owned (debit-normal).
    Asset,
    /// Obligations owed (credit-normal).
    Liability,
    /// Residual interest (credit-normal).
    Equity,
    /// Income earned (credit-normal).
    Revenue,
    /// Costs incurred (debit-normal).
    Expense,
}

impl GlAccountType {
    /// Returns true for debit-normal account types.
    #[must_use]
    pub const fn is_debit_normal(self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }

    /// Normal-balance direction: `+1` for debit-normal, `-1` for
    /// credit-normal.
    #[must_use]
    pub fn direction(self) -> Decimal {
        if self.is_debit_normal() {
            Decimal::ONE
        } else {
            Decimal::NEGATIVE_ONE
        }
    }

    /// String form used in persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for GlAccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculates the balance change of an entry for an account of the given
/// type.
///
/// Debit-normal accounts grow with debits; credit-normal accounts grow with
/// credits.
#[must_use]
pub fn balance_change(account_type: GlAccountType, debit: Decimal, credit: Decimal) -> Decimal {
    if account_type.is_debit_normal() {
        debit - credit
    } else {
        credit - debit
    }
}

/// Validates a parent assignment for a GL account.
///
/// A parent must share the child's account type, and an account can never
/// parent itself.
///
/// # Errors
///
/// Returns `LedgerError::InvalidParent` on violation.
pub fn validate_parent(
    account_id: Uuid,
    account_type: GlAccountType,
    parent_id: Uuid,
    parent_type: GlAccountType,
) -> Result<(), LedgerError> {
    if account_id == parent_id {
        return Err(LedgerError::InvalidParent(
            "an account cannot be its own parent".to_string(),
        ));
    }
    if account_type != parent_type {
        return Err(LedgerError::InvalidParent(format!(
            "parent type {parent_type} does not match account type {account_type}"
        )));
    }
    Ok(())
}
