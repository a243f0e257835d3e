//! Report generation service.
//!
//! Balances aggregate recursively from root accounts (no parent) down the
//! chart-of-accounts tree:
//!
//! ```text
//! direct_balance(A) = direction(A) * (sum(debit) - sum(credit))
//! tree_balance(A)   = direct_balance(A) + sum(tree_balance(child))
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use tamarind_shared::types::money::round2;

use super::types::{
    AccountActivity, BalanceSheetReport, CashbookEntry, CashbookLine, CashbookReport,
    GlAccountNode, IncomeStatementReport, ReportLine, ReportSection, TrialBalanceReport,
    TrialBalanceRow,
};
use crate::ledger::accounts::GlAccountType;

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Builds the report section for one account type: root lines with
    /// recursively aggregated tree balances.
    #[must_use]
    pub fn build_section(
        accounts: &[GlAccountNode],
        activity: &[AccountActivity],
        account_type: GlAccountType,
    ) -> ReportSection {
        let activity_by_id: HashMap<Uuid, (Decimal, Decimal)> = activity
            .iter()
            .map(|a| (a.gl_account_id, (a.total_debit, a.total_credit)))
            .collect();

        let mut children_of: HashMap<Uuid, Vec<&GlAccountNode>> = HashMap::new();
        let mut roots: Vec<&GlAccountNode> = Vec::new();
        for account in accounts.iter().filter(|a| a.account_type == account_type) {
            match account.parent_id {
                Some(parent) => children_of.entry(parent).or_default().push(account),
                None => roots.push(account),
            }
        }
        roots.sort_by(|a, b| a.code.cmp(&b.code));

        let lines: Vec<ReportLine> = roots
            .into_iter()
            .map(|root| Self::build_line(root, &children_of, &activity_by_id))
            .collect();
        let total = lines.iter().map(|l| l.tree_balance).sum();

        ReportSection { lines, total }
    }

    fn build_line(
        account: &GlAccountNode,
        children_of: &HashMap<Uuid, Vec<&GlAccountNode>>,
        activity: &HashMap<Uuid, (Decimal, Decimal)>,
    ) -> ReportLine {
        let (debit, credit) = activity
            .get(&account.id)
            .copied()
            .unwrap_or((Decimal::ZERO, Decimal::ZERO));
        let direct_balance = account.account_type.direction() * (debit - credit);

        let mut children: Vec<&GlAccountNode> =
            children_of.get(&account.id).cloned().unwrap_or_default();
        children.sort_by(|a, b| a.code.cmp(&b.code));
        let children: Vec<ReportLine> = children
            .into_iter()
            .map(|child| Self::build_line(child, children_of, activity))
            .collect();

        let tree_balance =
            direct_balance + children.iter().map(|c| c.tree_balance).sum::<Decimal>();

        ReportLine {
            code: account.code.clone(),
            name: account.name.clone(),
            direct_balance,
            tree_balance,
            children,
        }
    }

    /// Generates a balance sheet as of a date.
    ///
    /// The identity `assets == liabilities + equity` is checked after
    /// rounding both sides to 2 decimals.
    #[must_use]
    pub fn balance_sheet(
        accounts: &[GlAccountNode],
        activity: &[AccountActivity],
        as_of: NaiveDate,
    ) -> BalanceSheetReport {
        let assets = Self::build_section(accounts, activity, GlAccountType::Asset);
        let liabilities = Self::build_section(accounts, activity, GlAccountType::Liability);
        let equity = Self::build_section(accounts, activity, GlAccountType::Equity);

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total;
        let liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            as_of,
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            liabilities_and_equity,
            in_balance: round2(total_assets) == round2(liabilities_and_equity),
        }
    }

    /// Generates an income statement over an inclusive period.
    #[must_use]
    pub fn income_statement(
        accounts: &[GlAccountNode],
        activity: &[AccountActivity],
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> IncomeStatementReport {
        let revenue = Self::build_section(accounts, activity, GlAccountType::Revenue);
        let expenses = Self::build_section(accounts, activity, GlAccountType::Expense);

        let total_revenue = revenue.total;
        let total_expenses = expenses.total;

        IncomeStatementReport {
            period_start,
            period_end,
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_income: total_revenue - total_expenses,
        }
    }

    /// Generates a flat trial balance of all accounts with non-zero
    /// activity.
    #[must_use]
    pub fn trial_balance(
        accounts: &[GlAccountNode],
        activity: &[AccountActivity],
        as_of: NaiveDate,
    ) -> TrialBalanceReport {
        let accounts_by_id: HashMap<Uuid, &GlAccountNode> =
            accounts.iter().map(|a| (a.id, a)).collect();

        let mut rows: Vec<TrialBalanceRow> = activity
            .iter()
            .filter(|a| !a.total_debit.is_zero() || !a.total_credit.is_zero())
            .filter_map(|a| {
                accounts_by_id.get(&a.gl_account_id).map(|account| TrialBalanceRow {
                    code: account.code.clone(),
                    name: account.name.clone(),
                    total_debit: a.total_debit,
                    total_credit: a.total_credit,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));

        let total_debit: Decimal = rows.iter().map(|r| r.total_debit).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.total_credit).sum();

        TrialBalanceReport {
            as_of,
            rows,
            total_debit,
            total_credit,
            is_balanced: round2(total_debit) == round2(total_credit),
        }
    }

    /// Builds the cashbook from chronological cash-account entries. The
    /// running balance accumulates `debit - credit` in order.
    #[must_use]
    pub fn cashbook(entries: Vec<CashbookEntry>) -> CashbookReport {
        let mut running = Decimal::ZERO;
        let lines: Vec<CashbookLine> = entries
            .into_iter()
            .map(|entry| {
                running += entry.debit - entry.credit;
                CashbookLine {
                    transaction_date: entry.transaction_date,
                    description: entry.description,
                    debit: entry.debit,
                    credit: entry.credit,
                    running_balance: running,
                }
            })
            .collect();

        CashbookReport {
            lines,
            closing_balance: running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn node(
        id: Uuid,
        code: &str,
        account_type: GlAccountType,
        parent_id: Option<Uuid>,
    ) -> GlAccountNode {
        GlAccountNode {
            id,
            code: code.to_string(),
            name: format!("Account {code}"),
            account_type,
            parent_id,
        }
    }

    fn activity(id: Uuid, debit: Decimal, credit: Decimal) -> AccountActivity {
        AccountActivity {
            gl_account_id: id,
            total_debit: debit,
            total_credit: credit,
        }
    }

    /// One deposit of 500: cash 1010 debited, savings liability 2010
    /// credited.
    fn deposit_fixture() -> (Vec<GlAccountNode>, Vec<AccountActivity>, Uuid, Uuid) {
        let cash = Uuid::new_v4();
        let savings = Uuid::new_v4();
        let accounts = vec![
            node(cash, "1010", GlAccountType::Asset, None),
            node(savings, "2010", GlAccountType::Liability, None),
        ];
        let entries = vec![
            activity(cash, dec!(500), dec!(0)),
            activity(savings, dec!(0), dec!(500)),
        ];
        (accounts, entries, cash, savings)
    }

    #[test]
    fn test_balance_sheet_in_balance_after_deposit() {
        let (accounts, entries, _, _) = deposit_fixture();
        let report = ReportService::balance_sheet(&accounts, &entries, date(2026, 8, 6));
        assert_eq!(report.total_assets, dec!(500));
        assert_eq!(report.total_liabilities, dec!(500));
        assert_eq!(report.total_equity, dec!(0));
        assert!(report.in_balance);
    }

    #[test]
    fn test_tree_balance_aggregates_children() {
        let parent = Uuid::new_v4();
        let child_a = Uuid::new_v4();
        let child_b = Uuid::new_v4();
        let accounts = vec![
            node(parent, "1000", GlAccountType::Asset, None),
            node(child_a, "1010", GlAccountType::Asset, Some(parent)),
            node(child_b, "1020", GlAccountType::Asset, Some(parent)),
        ];
        let entries = vec![
            activity(parent, dec!(100), dec!(0)),
            activity(child_a, dec!(250), dec!(50)),
            activity(child_b, dec!(0), dec!(25)),
        ];

        let section = ReportService::build_section(&accounts, &entries, GlAccountType::Asset);
        assert_eq!(section.lines.len(), 1);
        let root = &section.lines[0];
        assert_eq!(root.direct_balance, dec!(100));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].code, "1010");
        assert_eq!(root.children[0].tree_balance, dec!(200));
        assert_eq!(root.children[1].tree_balance, dec!(-25));
        assert_eq!(root.tree_balance, dec!(275));
        assert_eq!(section.total, dec!(275));
    }

    #[test]
    fn test_income_statement_net_income() {
        let interest = Uuid::new_v4();
        let expenses = Uuid::new_v4();
        let accounts = vec![
            node(interest, "4010", GlAccountType::Revenue, None),
            node(expenses, "5010", GlAccountType::Expense, None),
        ];
        let entries = vec![
            activity(interest, dec!(0), dec!(900)),
            activity(expenses, dec!(350), dec!(0)),
        ];

        let report = ReportService::income_statement(
            &accounts,
            &entries,
            date(2026, 1, 1),
            date(2026, 12, 31),
        );
        assert_eq!(report.total_revenue, dec!(900));
        assert_eq!(report.total_expenses, dec!(350));
        assert_eq!(report.net_income, dec!(550));
    }

    #[test]
    fn test_trial_balance_skips_inactive_accounts() {
        let (mut accounts, entries, _, _) = deposit_fixture();
        // An account with no activity never shows up.
        accounts.push(node(Uuid::new_v4(), "5020", GlAccountType::Expense, None));

        let report = ReportService::trial_balance(&accounts, &entries, date(2026, 8, 6));
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.total_debit, dec!(500));
        assert_eq!(report.total_credit, dec!(500));
        assert!(report.is_balanced);
    }

    #[test]
    fn test_trial_balance_detects_imbalance() {
        let cash = Uuid::new_v4();
        let accounts = vec![node(cash, "1010", GlAccountType::Asset, None)];
        let entries = vec![activity(cash, dec!(500), dec!(0))];

        let report = ReportService::trial_balance(&accounts, &entries, date(2026, 8, 6));
        assert!(!report.is_balanced);
    }

    #[test]
    fn test_cashbook_running_balance() {
        let entries = vec![
            CashbookEntry {
                transaction_date: date(2026, 8, 1),
                description: "Deposit".to_string(),
                debit: dec!(500),
                credit: dec!(0),
            },
            CashbookEntry {
                transaction_date: date(2026, 8, 2),
                description: "Withdrawal".to_string(),
                debit: dec!(0),
                credit: dec!(200),
            },
            CashbookEntry {
                transaction_date: date(2026, 8, 3),
                description: "Fee".to_string(),
                debit: dec!(50),
                credit: dec!(0),
            },
        ];

        let report = ReportService::cashbook(entries);
        assert_eq!(report.lines[0].running_balance, dec!(500));
        assert_eq!(report.lines[1].running_balance, dec!(300));
        assert_eq!(report.lines[2].running_balance, dec!(350));
        assert_eq!(report.closing_balance, dec!(350));
    }

    #[test]
    fn test_cashbook_empty() {
        let report = ReportService::cashbook(vec![]);
        assert!(report.lines.is_empty());
        assert_eq!(report.closing_balance, dec!(0));
    }
}
