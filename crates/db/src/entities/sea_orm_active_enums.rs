//! `SeaORM` active enums mirroring the core domain enums.
//!
//! Conversions to and from the `tamarind-core` types keep the pure logic
//! free of persistence derive baggage.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use tamarind_core::catalog;
use tamarind_core::guarantee;
use tamarind_core::ledger::accounts;
use tamarind_core::loan;
use tamarind_core::transaction;

/// Product kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_kind")]
pub enum ProductKind {
    /// Withdrawable savings.
    #[sea_orm(string_value = "savings")]
    Savings,
    /// Venture investments.
    #[sea_orm(string_value = "venture")]
    Venture,
    /// Credit products.
    #[sea_orm(string_value = "loan")]
    Loan,
    /// Member fees.
    #[sea_orm(string_value = "fee")]
    Fee,
}

impl From<catalog::ProductKind> for ProductKind {
    fn from(kind: catalog::ProductKind) -> Self {
        match kind {
            catalog::ProductKind::Savings => Self::Savings,
            catalog::ProductKind::Venture => Self::Venture,
            catalog::ProductKind::Loan => Self::Loan,
            catalog::ProductKind::Fee => Self::Fee,
        }
    }
}

impl From<ProductKind> for catalog::ProductKind {
    fn from(kind: ProductKind) -> Self {
        match kind {
            ProductKind::Savings => Self::Savings,
            ProductKind::Venture => Self::Venture,
            ProductKind::Loan => Self::Loan,
            ProductKind::Fee => Self::Fee,
        }
    }
}

/// Fee classification, driving the credit side of fee postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fee_classification")]
pub enum FeeClassification {
    /// Fee income.
    #[sea_orm(string_value = "income")]
    Income,
    /// Held on behalf of members.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Contributed capital.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Recoverable advances.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Pass-through expense recovery.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<FeeClassification> for catalog::FeeClassification {
    fn from(classification: FeeClassification) -> Self {
        match classification {
            FeeClassification::Income => Self::Income,
            FeeClassification::Liability => Self::Liability,
            FeeClassification::Equity => Self::Equity,
            FeeClassification::Asset => Self::Asset,
            FeeClassification::Expense => Self::Expense,
        }
    }
}

impl From<catalog::FeeClassification> for FeeClassification {
    fn from(classification: catalog::FeeClassification) -> Self {
        match classification {
            catalog::FeeClassification::Income => Self::Income,
            catalog::FeeClassification::Liability => Self::Liability,
            catalog::FeeClassification::Equity => Self::Equity,
            catalog::FeeClassification::Asset => Self::Asset,
            catalog::FeeClassification::Expense => Self::Expense,
        }
    }
}

/// GL account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gl_account_type")]
pub enum GlAccountType {
    /// Debit-normal.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Credit-normal.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Credit-normal.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Credit-normal.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Debit-normal.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<GlAccountType> for accounts::GlAccountType {
    fn from(account_type: GlAccountType) -> Self {
        match account_type {
            GlAccountType::Asset => Self::Asset,
            GlAccountType::Liability => Self::Liability,
            GlAccountType::Equity => Self::Equity,
            GlAccountType::Revenue => Self::Revenue,
            GlAccountType::Expense => Self::Expense,
        }
    }
}

impl From<accounts::GlAccountType> for GlAccountType {
    fn from(account_type: accounts::GlAccountType) -> Self {
        match account_type {
            accounts::GlAccountType::Asset => Self::Asset,
            accounts::GlAccountType::Liability => Self::Liability,
            accounts::GlAccountType::Equity => Self::Equity,
            accounts::GlAccountType::Revenue => Self::Revenue,
            accounts::GlAccountType::Expense => Self::Expense,
        }
    }
}

/// Domain transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
pub enum TransactionKind {
    /// Savings deposit.
    #[sea_orm(string_value = "savings_deposit")]
    SavingsDeposit,
    /// Savings withdrawal.
    #[sea_orm(string_value = "savings_withdrawal")]
    SavingsWithdrawal,
    /// Venture deposit.
    #[sea_orm(string_value = "venture_deposit")]
    VentureDeposit,
    /// Venture payment.
    #[sea_orm(string_value = "venture_payment")]
    VenturePayment,
    /// Loan disbursement.
    #[sea_orm(string_value = "loan_disbursement")]
    LoanDisbursement,
    /// Loan repayment.
    #[sea_orm(string_value = "loan_repayment")]
    LoanRepayment,
    /// Fee payment.
    #[sea_orm(string_value = "fee_payment")]
    FeePayment,
    /// Loan interest accrual.
    #[sea_orm(string_value = "loan_interest_accrual")]
    LoanInterestAccrual,
}

impl From<transaction::TransactionKind> for TransactionKind {
    fn from(kind: transaction::TransactionKind) -> Self {
        match kind {
            transaction::TransactionKind::SavingsDeposit => Self::SavingsDeposit,
            transaction::TransactionKind::SavingsWithdrawal => Self::SavingsWithdrawal,
            transaction::TransactionKind::VentureDeposit => Self::VentureDeposit,
            transaction::TransactionKind::VenturePayment => Self::VenturePayment,
            transaction::TransactionKind::LoanDisbursement => Self::LoanDisbursement,
            transaction::TransactionKind::LoanRepayment => Self::LoanRepayment,
            transaction::TransactionKind::FeePayment => Self::FeePayment,
            transaction::TransactionKind::LoanInterestAccrual => Self::LoanInterestAccrual,
        }
    }
}

impl From<TransactionKind> for transaction::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::SavingsDeposit => Self::SavingsDeposit,
            TransactionKind::SavingsWithdrawal => Self::SavingsWithdrawal,
            TransactionKind::VentureDeposit => Self::VentureDeposit,
            TransactionKind::VenturePayment => Self::VenturePayment,
            TransactionKind::LoanDisbursement => Self::LoanDisbursement,
            TransactionKind::LoanRepayment => Self::LoanRepayment,
            TransactionKind::FeePayment => Self::FeePayment,
            TransactionKind::LoanInterestAccrual => Self::LoanInterestAccrual,
        }
    }
}

/// Transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
pub enum TransactionStatus {
    /// Recorded but unprocessed.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Awaiting settlement.
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Settled and immutable.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Failed.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected with no balance effect.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<transaction::TransactionStatus> for TransactionStatus {
    fn from(status: transaction::TransactionStatus) -> Self {
        match status {
            transaction::TransactionStatus::Pending => Self::Pending,
            transaction::TransactionStatus::Processing => Self::Processing,
            transaction::TransactionStatus::Completed => Self::Completed,
            transaction::TransactionStatus::Failed => Self::Failed,
            transaction::TransactionStatus::Approved => Self::Approved,
            transaction::TransactionStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<TransactionStatus> for transaction::TransactionStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Processing => Self::Processing,
            TransactionStatus::Completed => Self::Completed,
            TransactionStatus::Failed => Self::Failed,
            TransactionStatus::Approved => Self::Approved,
            TransactionStatus::Rejected => Self::Rejected,
        }
    }
}

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    /// Cash at the counter.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Mobile money transfer.
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
    /// Direct bank transfer.
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Cheque deposit.
    #[sea_orm(string_value = "cheque")]
    Cheque,
}

impl From<transaction::PaymentMethod> for PaymentMethod {
    fn from(method: transaction::PaymentMethod) -> Self {
        match method {
            transaction::PaymentMethod::Cash => Self::Cash,
            transaction::PaymentMethod::MobileMoney => Self::MobileMoney,
            transaction::PaymentMethod::BankTransfer => Self::BankTransfer,
            transaction::PaymentMethod::Cheque => Self::Cheque,
        }
    }
}

/// How a loan repayment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "repayment_type")]
pub enum RepaymentType {
    /// Reduces the outstanding balance.
    #[sea_orm(string_value = "principal")]
    Principal,
    /// Reduces accrued interest only.
    #[sea_orm(string_value = "interest_payment")]
    InterestPayment,
}

impl From<transaction::RepaymentType> for RepaymentType {
    fn from(repayment_type: transaction::RepaymentType) -> Self {
        match repayment_type {
            transaction::RepaymentType::Principal => Self::Principal,
            transaction::RepaymentType::InterestPayment => Self::InterestPayment,
        }
    }
}

impl From<RepaymentType> for transaction::RepaymentType {
    fn from(repayment_type: RepaymentType) -> Self {
        match repayment_type {
            RepaymentType::Principal => Self::Principal,
            RepaymentType::InterestPayment => Self::InterestPayment,
        }
    }
}

/// Loan application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "application_status")]
pub enum ApplicationStatus {
    /// Created; projection computed.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Handed to an administrator.
    #[sea_orm(string_value = "ready_for_amendment")]
    ReadyForAmendment,
    /// Amended; awaiting member acceptance.
    #[sea_orm(string_value = "amended")]
    Amended,
    /// Accepted but under-covered.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Fully covered.
    #[sea_orm(string_value = "ready_for_submission")]
    ReadyForSubmission,
    /// Submitted; capacity committed.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// Approved; loan account linked.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Disbursed. Terminal.
    #[sea_orm(string_value = "disbursed")]
    Disbursed,
    /// Declined. Terminal.
    #[sea_orm(string_value = "declined")]
    Declined,
    /// Cancelled. Terminal.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<loan::ApplicationStatus> for ApplicationStatus {
    fn from(status: loan::ApplicationStatus) -> Self {
        match status {
            loan::ApplicationStatus::Pending => Self::Pending,
            loan::ApplicationStatus::ReadyForAmendment => Self::ReadyForAmendment,
            loan::ApplicationStatus::Amended => Self::Amended,
            loan::ApplicationStatus::InProgress => Self::InProgress,
            loan::ApplicationStatus::ReadyForSubmission => Self::ReadyForSubmission,
            loan::ApplicationStatus::Submitted => Self::Submitted,
            loan::ApplicationStatus::Approved => Self::Approved,
            loan::ApplicationStatus::Disbursed => Self::Disbursed,
            loan::ApplicationStatus::Declined => Self::Declined,
            loan::ApplicationStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<ApplicationStatus> for loan::ApplicationStatus {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Pending => Self::Pending,
            ApplicationStatus::ReadyForAmendment => Self::ReadyForAmendment,
            ApplicationStatus::Amended => Self::Amended,
            ApplicationStatus::InProgress => Self::InProgress,
            ApplicationStatus::ReadyForSubmission => Self::ReadyForSubmission,
            ApplicationStatus::Submitted => Self::Submitted,
            ApplicationStatus::Approved => Self::Approved,
            ApplicationStatus::Disbursed => Self::Disbursed,
            ApplicationStatus::Declined => Self::Declined,
            ApplicationStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Projection calculation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "calculation_mode")]
pub enum CalculationMode {
    /// Solve for the payment.
    #[sea_orm(string_value = "fixed_term")]
    FixedTerm,
    /// Solve for the term.
    #[sea_orm(string_value = "fixed_payment")]
    FixedPayment,
}

impl From<loan::CalculationMode> for CalculationMode {
    fn from(mode: loan::CalculationMode) -> Self {
        match mode {
            loan::CalculationMode::FixedTerm => Self::FixedTerm,
            loan::CalculationMode::FixedPayment => Self::FixedPayment,
        }
    }
}

impl From<CalculationMode> for loan::CalculationMode {
    fn from(mode: CalculationMode) -> Self {
        match mode {
            CalculationMode::FixedTerm => Self::FixedTerm,
            CalculationMode::FixedPayment => Self::FixedPayment,
        }
    }
}

/// Repayment cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "repayment_frequency")]
pub enum RepaymentFrequency {
    /// Every day.
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Every 7 days.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Every 14 days.
    #[sea_orm(string_value = "biweekly")]
    Biweekly,
    /// Calendar months.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every 3 months.
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// Every 12 months.
    #[sea_orm(string_value = "annually")]
    Annually,
}

impl From<loan::RepaymentFrequency> for RepaymentFrequency {
    fn from(frequency: loan::RepaymentFrequency) -> Self {
        match frequency {
            loan::RepaymentFrequency::Daily => Self::Daily,
            loan::RepaymentFrequency::Weekly => Self::Weekly,
            loan::RepaymentFrequency::Biweekly => Self::Biweekly,
            loan::RepaymentFrequency::Monthly => Self::Monthly,
            loan::RepaymentFrequency::Quarterly => Self::Quarterly,
            loan::RepaymentFrequency::Annually => Self::Annually,
        }
    }
}

impl From<RepaymentFrequency> for loan::RepaymentFrequency {
    fn from(frequency: RepaymentFrequency) -> Self {
        match frequency {
            RepaymentFrequency::Daily => Self::Daily,
            RepaymentFrequency::Weekly => Self::Weekly,
            RepaymentFrequency::Biweekly => Self::Biweekly,
            RepaymentFrequency::Monthly => Self::Monthly,
            RepaymentFrequency::Quarterly => Self::Quarterly,
            RepaymentFrequency::Annually => Self::Annually,
        }
    }
}

/// Guarantee request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "guarantee_status")]
pub enum GuaranteeStatus {
    /// Awaiting the guarantor's answer.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted.
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Declined.
    #[sea_orm(string_value = "declined")]
    Declined,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<guarantee::GuaranteeStatus> for GuaranteeStatus {
    fn from(status: guarantee::GuaranteeStatus) -> Self {
        match status {
            guarantee::GuaranteeStatus::Pending => Self::Pending,
            guarantee::GuaranteeStatus::Accepted => Self::Accepted,
            guarantee::GuaranteeStatus::Declined => Self::Declined,
            guarantee::GuaranteeStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<GuaranteeStatus> for guarantee::GuaranteeStatus {
    fn from(status: GuaranteeStatus) -> Self {
        match status {
            GuaranteeStatus::Pending => Self::Pending,
            GuaranteeStatus::Accepted => Self::Accepted,
            GuaranteeStatus::Declined => Self::Declined,
            GuaranteeStatus::Cancelled => Self::Cancelled,
        }
    }
}
