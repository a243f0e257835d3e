//! Product catalog domain types.
//!
//! A product type defines a class of member account. Adding a type
//! provisions one account of that type for every existing member; the
//! provisioning itself lives in the repository layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by catalog validation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product type name is empty.
    #[error("product type name must not be empty")]
    EmptyName,
    /// Interest rate missing for a kind that requires one.
    #[error("{0} products require an interest rate")]
    MissingInterestRate(ProductKind),
    /// Standard amount missing for fee products.
    #[error("fee products require a standard amount")]
    MissingStandardAmount,
}

/// The four product kinds a member can hold accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Withdrawable member savings.
    Savings,
    /// Venture investment deposits.
    Venture,
    /// Credit products with an outstanding balance.
    Loan,
    /// Fees charged against members.
    Fee,
}

impl ProductKind {
    /// All kinds, in provisioning order.
    pub const ALL: [Self; 4] = [Self::Savings, Self::Venture, Self::Loan, Self::Fee];

    /// Account number prefix for this kind. Fee accounts carry no prefix.
    #[must_use]
    pub const fn account_prefix(self) -> &'static str {
        match self {
            Self::Savings => "WM",
            Self::Venture => "VN",
            Self::Loan => "LN",
            Self::Fee => "",
        }
    }

    /// Number of random digits in an account number of this kind.
    #[must_use]
    pub const fn account_digits(self) -> usize {
        match self {
            Self::Savings => 10,
            Self::Venture | Self::Loan | Self::Fee => 8,
        }
    }

    /// Returns true if this kind carries an interest rate.
    #[must_use]
    pub const fn has_interest_rate(self) -> bool {
        matches!(self, Self::Loan | Self::Venture)
    }

    /// String form used in persistence and identities.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Venture => "venture",
            Self::Loan => "loan",
            Self::Fee => "fee",
        }
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a fee type, driving the credit side of its posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeClassification {
    /// Fee income (default).
    Income,
    /// Held on behalf of members.
    Liability,
    /// Contributed capital.
    Equity,
    /// Recoverable advances.
    Asset,
    /// Pass-through expense recovery.
    Expense,
}

impl FeeClassification {
    /// The GL account code credited when a fee of this classification is
    /// paid.
    #[must_use]
    pub const fn credit_account_code(self) -> &'static str {
        match self {
            Self::Income => "4020",
            Self::Liability => "2030",
            Self::Equity => "3020",
            Self::Asset => "1020",
            Self::Expense => "5010",
        }
    }

    /// String form used in persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Asset => "asset",
            Self::Expense => "expense",
        }
    }
}

/// Validates the fields of a new or updated product type.
///
/// # Errors
///
/// Returns a `CatalogError` naming the violated rule.
pub fn validate_product_type(
    kind: ProductKind,
    name: &str,
    interest_rate: Option<rust_decimal::Decimal>,
    standard_amount: Option<rust_decimal::Decimal>,
) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::EmptyName);
    }
    if kind.has_interest_rate() && interest_rate.is_none() {
        return Err(CatalogError::MissingInterestRate(kind));
    }
    if kind == ProductKind::Fee && standard_amount.is_none() {
        return Err(CatalogError::MissingStandardAmount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_prefixes() {
        assert_eq!(ProductKind::Savings.account_prefix(), "WM");
        assert_eq!(ProductKind::Venture.account_prefix(), "VN");
        assert_eq!(ProductKind::Loan.account_prefix(), "LN");
        assert_eq!(ProductKind::Fee.account_prefix(), "");
    }

    #[test]
    fn test_account_digits() {
        assert_eq!(ProductKind::Savings.account_digits(), 10);
        assert_eq!(ProductKind::Venture.account_digits(), 8);
        assert_eq!(ProductKind::Loan.account_digits(), 8);
        assert_eq!(ProductKind::Fee.account_digits(), 8);
    }

    #[test]
    fn test_fee_classification_credit_accounts() {
        assert_eq!(FeeClassification::Income.credit_account_code(), "4020");
        assert_eq!(FeeClassification::Liability.credit_account_code(), "2030");
        assert_eq!(FeeClassification::Equity.credit_account_code(), "3020");
        assert_eq!(FeeClassification::Asset.credit_account_code(), "1020");
        assert_eq!(FeeClassification::Expense.credit_account_code(), "5010");
    }

    #[test]
    fn test_validate_product_type_ok() {
        assert!(validate_product_type(ProductKind::Savings, "Main Savings", None, None).is_ok());
        assert!(
            validate_product_type(ProductKind::Loan, "Development Loan", Some(dec!(10)), None)
                .is_ok()
        );
        assert!(
            validate_product_type(ProductKind::Fee, "Registration", None, Some(dec!(1000)))
                .is_ok()
        );
    }

    #[test]
    fn test_validate_product_type_rejects_empty_name() {
        assert!(matches!(
            validate_product_type(ProductKind::Savings, "  ", None, None),
            Err(CatalogError::EmptyName)
        ));
    }

    #[test]
    fn test_validate_product_type_requires_rate_for_loans() {
        assert!(matches!(
            validate_product_type(ProductKind::Loan, "Loan", None, None),
            Err(CatalogError::MissingInterestRate(ProductKind::Loan))
        ));
    }

    #[test]
    fn test_validate_product_type_requires_standard_amount_for_fees() {
        assert!(matches!(
            validate_product_type(ProductKind::Fee, "Fee", None, None),
            Err(CatalogError::MissingStandardAmount)
        ));
    }
}
