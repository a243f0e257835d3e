//! Report payload types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::accounts::GlAccountType;

/// A GL account as a node of the chart-of-accounts tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlAccountNode {
    /// Account id.
    pub id: Uuid,
    /// Short numeric code.
    pub code: String,
    /// Human name.
    pub name: String,
    /// Classification, driving the normal-balance direction.
    pub account_type: GlAccountType,
    /// Parent account, same type only.
    pub parent_id: Option<Uuid>,
}

/// Summed journal entry activity for one GL account up to a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountActivity {
    /// The GL account.
    pub gl_account_id: Uuid,
    /// Sum of debit amounts.
    pub total_debit: Decimal,
    /// Sum of credit amounts.
    pub total_credit: Decimal,
}

/// One line of a hierarchical report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Balance from this account's own entries.
    pub direct_balance: Decimal,
    /// Direct balance plus all descendants.
    pub tree_balance: Decimal,
    /// Child lines, ordered by code.
    pub children: Vec<ReportLine>,
}

/// One classified section of a report (assets, revenue, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    /// Root lines of the section.
    pub lines: Vec<ReportLine>,
    /// Sum of the root tree balances.
    pub total: Decimal,
}

/// Balance sheet as of a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Report date.
    pub as_of: NaiveDate,
    /// Asset tree (debit-normal).
    pub assets: ReportSection,
    /// Liability tree (credit-normal).
    pub liabilities: ReportSection,
    /// Equity tree (credit-normal).
    pub equity: ReportSection,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Decimal,
    /// Accounting identity holds after 2-dp rounding.
    pub in_balance: bool,
}

/// Income statement over a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Period start (inclusive).
    pub period_start: NaiveDate,
    /// Period end (inclusive).
    pub period_end: NaiveDate,
    /// Revenue tree (credit-normal).
    pub revenue: ReportSection,
    /// Expense tree (debit-normal).
    pub expenses: ReportSection,
    /// Total revenue.
    pub total_revenue: Decimal,
    /// Total expenses.
    pub total_expenses: Decimal,
    /// Revenue minus expenses.
    pub net_income: Decimal,
}

/// One row of the trial balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

/// Flat trial balance of accounts with activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Report date.
    pub as_of: NaiveDate,
    /// Accounts with non-zero activity, ordered by code.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of all debits.
    pub total_debit: Decimal,
    /// Sum of all credits.
    pub total_credit: Decimal,
    /// Totals match after 2-dp rounding.
    pub is_balanced: bool,
}

/// One journal entry row feeding the cashbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashbookEntry {
    /// Civil date of the transaction.
    pub transaction_date: NaiveDate,
    /// Journal description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// One cashbook line with its running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbookLine {
    /// Civil date of the transaction.
    pub transaction_date: NaiveDate,
    /// Journal description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Cumulative debit-minus-credit balance.
    pub running_balance: Decimal,
}

/// Chronological cash account listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbookReport {
    /// Lines in `(transaction_date, created_at)` order.
    pub lines: Vec<CashbookLine>,
    /// Final running balance.
    pub closing_balance: Decimal,
}
