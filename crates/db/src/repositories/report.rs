//! Financial reporting queries.
//!
//! All reports derive from journal entries only: this repository sums
//! per-account activity and streams cashbook rows; the tree aggregation
//! itself is pure and lives in `tamarind_core::reports`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, QueryFilter,
    Statement,
};
use uuid::Uuid;

use tamarind_core::reports::{
    AccountActivity, BalanceSheetReport, CashbookEntry, CashbookReport, GlAccountNode,
    IncomeStatementReport, ReportService, TrialBalanceReport,
};

use crate::entities::gl_accounts;
use crate::error::DbResult;

/// Cash account code driving the cashbook.
const CASH_ACCOUNT_CODE: &str = "1010";

#[derive(Debug, FromQueryResult)]
struct ActivityRow {
    gl_account_id: Uuid,
    total_debit: Decimal,
    total_credit: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct CashbookRow {
    transaction_date: NaiveDate,
    description: String,
    debit: Decimal,
    credit: Decimal,
}

/// Repository for ledger-derived reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The chart of accounts as tree nodes.
    pub async fn gl_nodes(&self) -> DbResult<Vec<GlAccountNode>> {
        let rows = gl_accounts::Entity::find()
            .filter(gl_accounts::Column::IsActive.eq(true))
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| GlAccountNode {
                id: row.id,
                code: row.code,
                name: row.name,
                account_type: row.account_type.into(),
                parent_id: row.parent_id,
            })
            .collect())
    }

    /// Per-account debit/credit sums for entries dated on or before
    /// `as_of`.
    pub async fn activity_through(&self, as_of: NaiveDate) -> DbResult<Vec<AccountActivity>> {
        let rows = ActivityRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"SELECT gl_account_id,
                     COALESCE(SUM(debit), 0) AS total_debit,
                     COALESCE(SUM(credit), 0) AS total_credit
              FROM journal_entries
              WHERE transaction_date <= $1
              GROUP BY gl_account_id",
            [as_of.into()],
        ))
        .all(&self.db)
        .await?;
        Ok(rows.into_iter().map(into_activity).collect())
    }

    /// Per-account debit/credit sums for entries within an inclusive
    /// period.
    pub async fn activity_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<AccountActivity>> {
        let rows = ActivityRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"SELECT gl_account_id,
                     COALESCE(SUM(debit), 0) AS total_debit,
                     COALESCE(SUM(credit), 0) AS total_credit
              FROM journal_entries
              WHERE transaction_date BETWEEN $1 AND $2
              GROUP BY gl_account_id",
            [start.into(), end.into()],
        ))
        .all(&self.db)
        .await?;
        Ok(rows.into_iter().map(into_activity).collect())
    }

    /// Balance sheet as of a date.
    pub async fn balance_sheet(&self, as_of: NaiveDate) -> DbResult<BalanceSheetReport> {
        let nodes = self.gl_nodes().await?;
        let activity = self.activity_through(as_of).await?;
        Ok(ReportService::balance_sheet(&nodes, &activity, as_of))
    }

    /// Income statement over an inclusive period.
    pub async fn income_statement(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<IncomeStatementReport> {
        let nodes = self.gl_nodes().await?;
        let activity = self.activity_between(start, end).await?;
        Ok(ReportService::income_statement(&nodes, &activity, start, end))
    }

    /// Trial balance as of a date.
    pub async fn trial_balance(&self, as_of: NaiveDate) -> DbResult<TrialBalanceReport> {
        let nodes = self.gl_nodes().await?;
        let activity = self.activity_through(as_of).await?;
        Ok(ReportService::trial_balance(&nodes, &activity, as_of))
    }

    /// Cashbook: the chronological listing of cash-account entries with
    /// a running balance, ordered `(transaction_date, created_at)`.
    pub async fn cashbook(&self) -> DbResult<CashbookReport> {
        let rows = CashbookRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"SELECT je.transaction_date,
                     j.description,
                     je.debit,
                     je.credit
              FROM journal_entries je
              JOIN journals j ON j.id = je.journal_id
              JOIN gl_accounts a ON a.id = je.gl_account_id
              WHERE a.code = $1
              ORDER BY je.transaction_date ASC, je.created_at ASC",
            [CASH_ACCOUNT_CODE.into()],
        ))
        .all(&self.db)
        .await?;

        let entries = rows
            .into_iter()
            .map(|row| CashbookEntry {
                transaction_date: row.transaction_date,
                description: row.description,
                debit: row.debit,
                credit: row.credit,
            })
            .collect();
        Ok(ReportService::cashbook(entries))
    }
}

fn into_activity(row: ActivityRow) -> AccountActivity {
    AccountActivity {
        gl_account_id: row.gl_account_id,
        total_debit: row.total_debit,
        total_credit: row.total_credit,
    }
}
