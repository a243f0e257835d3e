//! Domain transaction kinds, statuses, and settlement rules.
//!
//! A domain transaction records one movement of member money. Balance
//! mutation and ledger posting happen when a transaction reaches its
//! terminal settled state; the orchestration lives in the repository layer,
//! the rules live here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::template::PostingEvent;

/// Errors raised by transaction settlement rules.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Amount must be strictly positive.
    #[error("transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    /// The status transition is not permitted for this kind.
    #[error("cannot move {kind} transaction from {from} to {to}")]
    InvalidTransition {
        /// Transaction kind.
        kind: TransactionKind,
        /// Current status.
        from: TransactionStatus,
        /// Requested status.
        to: TransactionStatus,
    },
    /// Completed transactions are immutable.
    #[error("transaction is settled and immutable")]
    Immutable,
}

/// The eight domain transaction variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Member deposit into a savings account.
    SavingsDeposit,
    /// Member withdrawal from a savings account.
    SavingsWithdrawal,
    /// Member deposit into a venture account.
    VentureDeposit,
    /// Payout from a venture account.
    VenturePayment,
    /// Loan principal released to a member.
    LoanDisbursement,
    /// Repayment against a loan account.
    LoanRepayment,
    /// Payment of a member fee.
    FeePayment,
    /// Operator-entered loan interest accrual.
    LoanInterestAccrual,
}

impl TransactionKind {
    /// Prefix for daily-sequenced transaction identities.
    #[must_use]
    pub const fn identity_prefix(self) -> &'static str {
        match self {
            Self::SavingsDeposit => "SD",
            Self::SavingsWithdrawal => "SW",
            Self::VentureDeposit => "VD",
            Self::VenturePayment => "VP",
            Self::LoanDisbursement => "LD",
            Self::LoanRepayment => "LR",
            Self::FeePayment => "FP",
            Self::LoanInterestAccrual => "LI",
        }
    }

    /// Whether settling this kind increases the target account balance.
    ///
    /// Loan accounts track money owed, so a disbursement increases the
    /// outstanding balance and a repayment decreases it.
    #[must_use]
    pub const fn is_inflow(self) -> bool {
        match self {
            Self::SavingsDeposit
            | Self::VentureDeposit
            | Self::LoanDisbursement
            | Self::LoanInterestAccrual
            | Self::FeePayment => true,
            Self::SavingsWithdrawal | Self::VenturePayment | Self::LoanRepayment => false,
        }
    }

    /// The signed balance delta applied at settlement.
    #[must_use]
    pub fn signed_delta(self, amount: Decimal) -> Decimal {
        if self.is_inflow() { amount } else { -amount }
    }

    /// Status assigned at creation. Withdrawals are member requests and
    /// settle later; every other kind settles immediately.
    #[must_use]
    pub const fn initial_status(self) -> TransactionStatus {
        match self {
            Self::SavingsWithdrawal => TransactionStatus::Processing,
            _ => TransactionStatus::Completed,
        }
    }

    /// The posting event for this kind. Loan repayments split on the
    /// repayment type.
    #[must_use]
    pub const fn posting_event(self, repayment_type: Option<RepaymentType>) -> PostingEvent {
        match self {
            Self::SavingsDeposit => PostingEvent::SavingsDeposit,
            Self::SavingsWithdrawal => PostingEvent::SavingsWithdrawal,
            Self::VentureDeposit => PostingEvent::VentureDeposit,
            Self::VenturePayment => PostingEvent::VenturePayment,
            Self::LoanDisbursement => PostingEvent::LoanDisbursement,
            Self::LoanRepayment => match repayment_type {
                Some(RepaymentType::InterestPayment) => PostingEvent::LoanRepaymentInterest,
                _ => PostingEvent::LoanRepaymentPrincipal,
            },
            Self::FeePayment => PostingEvent::FeePayment,
            Self::LoanInterestAccrual => PostingEvent::LoanInterestAccrual,
        }
    }

    /// String form used in persistence and bulk batch references.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SavingsDeposit => "savings_deposit",
            Self::SavingsWithdrawal => "savings_withdrawal",
            Self::VentureDeposit => "venture_deposit",
            Self::VenturePayment => "venture_payment",
            Self::LoanDisbursement => "loan_disbursement",
            Self::LoanRepayment => "loan_repayment",
            Self::FeePayment => "fee_payment",
            Self::LoanInterestAccrual => "loan_interest_accrual",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Recorded but not yet processed.
    Pending,
    /// Awaiting settlement (withdrawal requests).
    Processing,
    /// Settled; balances and ledger updated. Immutable.
    Completed,
    /// Processing failed.
    Failed,
    /// Approved by an administrator.
    Approved,
    /// Rejected by an administrator; no balance effect.
    Rejected,
}

impl TransactionStatus {
    /// Returns true for the terminal settled state that triggers balance
    /// mutation and ledger posting.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true for states that permit no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Rejected)
    }

    /// String form used in persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment methods accepted by operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the counter.
    Cash,
    /// Mobile money transfer.
    MobileMoney,
    /// Direct bank transfer.
    BankTransfer,
    /// Cheque deposit.
    Cheque,
}

impl PaymentMethod {
    /// Parses the method from the bulk-ingestion cell format.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "cash" => Some(Self::Cash),
            "mobile_money" | "mpesa" => Some(Self::MobileMoney),
            "bank_transfer" | "bank" => Some(Self::BankTransfer),
            "cheque" | "check" => Some(Self::Cheque),
            _ => None,
        }
    }
}

/// How a loan repayment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentType {
    /// Reduces the outstanding principal balance.
    Principal,
    /// Reduces accrued interest only.
    InterestPayment,
}

/// Validates the amount of a new transaction.
///
/// # Errors
///
/// Returns `TransactionError::NonPositiveAmount` for zero or negative
/// amounts.
pub fn validate_amount(amount: Decimal) -> Result<(), TransactionError> {
    if amount <= Decimal::ZERO {
        return Err(TransactionError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Checks a withdrawal settlement transition.
///
/// Withdrawal requests are created `Processing`; an administrator settles
/// them to `Completed` (triggering the balance mutation) or `Rejected`.
///
/// # Errors
///
/// Returns `TransactionError::InvalidTransition` for any other move.
pub fn validate_withdrawal_transition(
    from: TransactionStatus,
    to: TransactionStatus,
) -> Result<(), TransactionError> {
    match (from, to) {
        (
            TransactionStatus::Processing,
            TransactionStatus::Completed | TransactionStatus::Rejected,
        ) => Ok(()),
        _ => Err(TransactionError::InvalidTransition {
            kind: TransactionKind::SavingsWithdrawal,
            from,
            to,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_identity_prefixes_are_unique() {
        let kinds = [
            TransactionKind::SavingsDeposit,
            TransactionKind::SavingsWithdrawal,
            TransactionKind::VentureDeposit,
            TransactionKind::VenturePayment,
            TransactionKind::LoanDisbursement,
            TransactionKind::LoanRepayment,
            TransactionKind::FeePayment,
            TransactionKind::LoanInterestAccrual,
        ];
        let mut prefixes: Vec<_> = kinds.iter().map(|k| k.identity_prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), kinds.len());
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(
            TransactionKind::SavingsDeposit.signed_delta(dec!(500)),
            dec!(500)
        );
        assert_eq!(
            TransactionKind::SavingsWithdrawal.signed_delta(dec!(500)),
            dec!(-500)
        );
        assert_eq!(
            TransactionKind::LoanDisbursement.signed_delta(dec!(60000)),
            dec!(60000)
        );
        assert_eq!(
            TransactionKind::LoanRepayment.signed_delta(dec!(6000)),
            dec!(-6000)
        );
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(
            TransactionKind::SavingsWithdrawal.initial_status(),
            TransactionStatus::Processing
        );
        assert_eq!(
            TransactionKind::SavingsDeposit.initial_status(),
            TransactionStatus::Completed
        );
        assert_eq!(
            TransactionKind::FeePayment.initial_status(),
            TransactionStatus::Completed
        );
    }

    #[test]
    fn test_posting_event_for_repayments() {
        assert_eq!(
            TransactionKind::LoanRepayment.posting_event(Some(RepaymentType::Principal)),
            PostingEvent::LoanRepaymentPrincipal
        );
        assert_eq!(
            TransactionKind::LoanRepayment.posting_event(Some(RepaymentType::InterestPayment)),
            PostingEvent::LoanRepaymentInterest
        );
        assert_eq!(
            TransactionKind::LoanRepayment.posting_event(None),
            PostingEvent::LoanRepaymentPrincipal
        );
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec!(0.01)).is_ok());
        assert!(matches!(
            validate_amount(dec!(0)),
            Err(TransactionError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            validate_amount(dec!(-5)),
            Err(TransactionError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_withdrawal_transitions() {
        assert!(
            validate_withdrawal_transition(
                TransactionStatus::Processing,
                TransactionStatus::Completed
            )
            .is_ok()
        );
        assert!(
            validate_withdrawal_transition(
                TransactionStatus::Processing,
                TransactionStatus::Rejected
            )
            .is_ok()
        );
        assert!(
            validate_withdrawal_transition(
                TransactionStatus::Completed,
                TransactionStatus::Rejected
            )
            .is_err()
        );
        assert!(
            validate_withdrawal_transition(
                TransactionStatus::Pending,
                TransactionStatus::Completed
            )
            .is_err()
        );
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("Cash"), Some(PaymentMethod::Cash));
        assert_eq!(
            PaymentMethod::parse("Bank Transfer"),
            Some(PaymentMethod::BankTransfer)
        );
        assert_eq!(
            PaymentMethod::parse("mpesa"),
            Some(PaymentMethod::MobileMoney)
        );
        assert_eq!(PaymentMethod::parse("barter"), None);
    }

    #[test]
    fn test_settled_is_terminal() {
        assert!(TransactionStatus::Completed.is_settled());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(!TransactionStatus::Processing.is_terminal());
        assert!(TransactionStatus::Rejected.is_terminal());
        assert!(!TransactionStatus::Rejected.is_settled());
    }
}
