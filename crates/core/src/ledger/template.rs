//! Posting templates for domain events.
//!
//! A template maps a domain event to the GL accounts it touches; the amount
//! is supplied at posting time. Operators may pre-seed templates to override
//! the accounts; the built-in mapping below is the fallback, lazily
//! persisted on first use by the repository layer.

use serde::{Deserialize, Serialize};

use super::accounts::GlAccountType;
use super::error::LedgerError;
use crate::catalog::FeeClassification;

/// Minimum seeded chart of accounts: (code, name, type).
pub const SEED_CHART: &[(&str, &str, GlAccountType)] = &[
    ("1010", "Cash at Bank", GlAccountType::Asset),
    ("1020", "Loans Receivable", GlAccountType::Asset),
    ("1030", "Interest Receivable", GlAccountType::Asset),
    ("2010", "Member Savings Deposits", GlAccountType::Liability),
    ("2020", "Member Venture Deposits", GlAccountType::Liability),
    ("2030", "Member Contributions", GlAccountType::Liability),
    ("3010", "Retained Earnings", GlAccountType::Equity),
    ("3020", "Share Capital", GlAccountType::Equity),
    ("4010", "Interest Income", GlAccountType::Revenue),
    ("4020", "Membership Fees", GlAccountType::Revenue),
    ("5010", "Operating Expenses", GlAccountType::Expense),
    ("5020", "Bank Charges", GlAccountType::Expense),
];

/// Domain events with a posting template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingEvent {
    /// Cash in, savings liability up.
    SavingsDeposit,
    /// Savings liability down, cash out.
    SavingsWithdrawal,
    /// Cash in, venture liability up.
    VentureDeposit,
    /// Venture liability down, cash out.
    VenturePayment,
    /// Loans receivable up, cash out.
    LoanDisbursement,
    /// Cash in, loans receivable down.
    LoanRepaymentPrincipal,
    /// Cash in, interest receivable down.
    LoanRepaymentInterest,
    /// Interest receivable up, interest income up.
    LoanInterestAccrual,
    /// Cash in, credit per fee classification.
    FeePayment,
}

impl PostingEvent {
    /// Template code for this event.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SavingsDeposit => "savings_deposit",
            Self::SavingsWithdrawal => "savings_withdrawal",
            Self::VentureDeposit => "venture_deposit",
            Self::VenturePayment => "venture_payment",
            Self::LoanDisbursement => "loan_disbursement",
            Self::LoanRepaymentPrincipal => "loan_repayment_principal",
            Self::LoanRepaymentInterest => "loan_repayment_interest",
            Self::LoanInterestAccrual => "loan_interest_accrual",
            Self::FeePayment => "fee_payment",
        }
    }

    /// Parses an event from its template code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "savings_deposit" => Some(Self::SavingsDeposit),
            "savings_withdrawal" => Some(Self::SavingsWithdrawal),
            "venture_deposit" => Some(Self::VentureDeposit),
            "venture_payment" => Some(Self::VenturePayment),
            "loan_disbursement" => Some(Self::LoanDisbursement),
            "loan_repayment_principal" => Some(Self::LoanRepaymentPrincipal),
            "loan_repayment_interest" => Some(Self::LoanRepaymentInterest),
            "loan_interest_accrual" => Some(Self::LoanInterestAccrual),
            "fee_payment" => Some(Self::FeePayment),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One line of a posting template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLine {
    /// GL account code touched by this line.
    pub gl_code: String,
    /// Debit line when true, credit line otherwise.
    pub is_debit: bool,
}

impl TemplateLine {
    fn debit(gl_code: &str) -> Self {
        Self {
            gl_code: gl_code.to_string(),
            is_debit: true,
        }
    }

    fn credit(gl_code: &str) -> Self {
        Self {
            gl_code: gl_code.to_string(),
            is_debit: false,
        }
    }
}

/// Built-in (DR, CR) account codes for an event.
#[must_use]
pub const fn builtin_mapping(event: PostingEvent) -> (&'static str, &'static str) {
    match event {
        PostingEvent::SavingsDeposit => ("1010", "2010"),
        PostingEvent::SavingsWithdrawal => ("2010", "1010"),
        PostingEvent::VentureDeposit => ("1010", "2020"),
        PostingEvent::VenturePayment => ("2020", "1010"),
        PostingEvent::LoanDisbursement => ("1020", "1010"),
        PostingEvent::LoanRepaymentPrincipal => ("1010", "1020"),
        PostingEvent::LoanRepaymentInterest => ("1010", "1030"),
        PostingEvent::LoanInterestAccrual => ("1030", "4010"),
        PostingEvent::FeePayment => ("1010", "4020"),
    }
}

/// Built-in template lines for an event.
#[must_use]
pub fn builtin_lines(event: PostingEvent) -> Vec<TemplateLine> {
    let (dr, cr) = builtin_mapping(event);
    vec![TemplateLine::debit(dr), TemplateLine::credit(cr)]
}

/// Template code for the per-variant fee template, e.g.
/// `fee_payment_registration`.
#[must_use]
pub fn fee_template_code(fee_type_code: &str) -> String {
    format!("fee_payment_{fee_type_code}")
}

/// Template lines for a fee payment, with the credit account chosen from
/// the fee type's classification.
#[must_use]
pub fn fee_payment_lines(classification: FeeClassification) -> Vec<TemplateLine> {
    vec![
        TemplateLine::debit("1010"),
        TemplateLine::credit(classification.credit_account_code()),
    ]
}

/// Resolves an event code into template lines, preferring a stored
/// template when one is supplied by the repository layer.
///
/// # Errors
///
/// Returns `LedgerError::UnknownEvent` when the code has neither a stored
/// template nor a built-in mapping.
pub fn resolve_lines(
    code: &str,
    stored: Option<Vec<TemplateLine>>,
) -> Result<Vec<TemplateLine>, LedgerError> {
    if let Some(lines) = stored {
        return Ok(lines);
    }
    PostingEvent::from_code(code)
        .map(builtin_lines)
        .ok_or_else(|| LedgerError::UnknownEvent(code.to_string()))
}
