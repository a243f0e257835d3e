//! Bulk ingestion orchestrator.
//!
//! Processes a typed batch of rows (produced by the external CSV
//! collaborator) transactionally: each row runs in its own savepoint, so
//! failures are captured per row without aborting the batch. The original
//! CSV is archived and a summary mail goes out strictly after commit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tamarind_core::bulk::{BatchOutcome, BatchSummary, row_reference};
use tamarind_core::ident::format_bulk_reference;
use tamarind_core::storage::ArchiveStore;
use tamarind_core::transaction::{PaymentMethod, RepaymentType, TransactionKind};
use tamarind_shared::email::Mailer;
use tamarind_shared::types::money::Currency;

use super::now;
use super::transaction::{RecordTransaction, settle_in_txn};
use crate::entities::{accounts, bulk_transaction_logs, members};
use crate::error::{DbError, DbResult};

/// One typed row of a bulk batch.
#[derive(Debug, Clone)]
pub struct BulkRow {
    /// Target account number.
    pub account_number: String,
    /// Amount, already validated by the cell contract.
    pub amount: Decimal,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

/// A typed batch handed over by the CSV collaborator.
#[derive(Debug, Clone)]
pub struct BulkBatch {
    /// Transaction kind every row records.
    pub kind: TransactionKind,
    /// The rows, in file order.
    pub rows: Vec<BulkRow>,
    /// Original file name, if known.
    pub file_name: Option<String>,
    /// Raw CSV bytes for post-commit archival.
    pub csv: Option<Vec<u8>>,
    /// Civil date applied to every row.
    pub batch_date: NaiveDate,
    /// Operator running the batch.
    pub recorded_by: Uuid,
}

/// Result of a processed batch.
#[derive(Debug)]
pub struct BulkResult {
    /// The persisted batch log.
    pub log: bulk_transaction_logs::Model,
    /// Per-row accounting.
    pub summary: BatchSummary,
    /// Created vs all-failed.
    pub outcome: BatchOutcome,
    /// Archive URL when the post-commit upload succeeded.
    pub archive_url: Option<String>,
    /// Informational: archival failure, never fatal.
    pub archive_error: Option<String>,
}

/// Repository orchestrating bulk batches.
pub struct BulkRepository {
    db: DatabaseConnection,
    archive: Option<ArchiveStore>,
    mailer: Option<Mailer>,
}

impl BulkRepository {
    /// Creates a new bulk repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            archive: None,
            mailer: None,
        }
    }

    /// Attaches an archive store for post-commit CSV upload.
    #[must_use]
    pub fn with_archive(mut self, archive: ArchiveStore) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Attaches a mailer for the post-commit summary.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Processes a batch: every row in its own savepoint, the log row in
    /// the same transaction, archival and mail after commit.
    #[instrument(skip(self, batch), fields(kind = %batch.kind, rows = batch.rows.len()))]
    pub async fn process(&self, batch: BulkBatch) -> DbResult<BulkResult> {
        let prefix = format_bulk_reference(batch.kind.as_str(), batch.batch_date);
        let mut summary = BatchSummary::new();

        let txn = self.db.begin().await?;

        for (index, row) in batch.rows.iter().enumerate() {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            let reference = row_reference(&prefix, index + 1);

            let savepoint = txn.begin().await?;
            match process_row(&savepoint, &batch, row, &reference).await {
                Ok(()) => {
                    savepoint.commit().await?;
                    summary.record_success();
                }
                Err(err) => {
                    savepoint.rollback().await?;
                    warn!(index, error = %err, "bulk row failed");
                    summary.record_failure(index, err.to_string());
                }
            }
        }

        let timestamp = now();
        let log = bulk_transaction_logs::ActiveModel {
            id: Set(Uuid::now_v7()),
            recorded_by: Set(batch.recorded_by),
            transaction_kind: Set(batch.kind.into()),
            reference_prefix: Set(prefix.clone()),
            success_count: Set(i32::try_from(summary.success_count).unwrap_or(i32::MAX)),
            error_count: Set(i32::try_from(summary.error_count).unwrap_or(i32::MAX)),
            errors: Set(serde_json::to_value(&summary.failures)
                .map_err(|e| DbError::Integrity(e.to_string()))?),
            file_name: Set(batch.file_name.clone()),
            archive_url: Set(None),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(
            success = summary.success_count,
            errors = summary.error_count,
            "bulk batch committed"
        );

        // Post-commit side effects: failures are informational only.
        let (archive_url, archive_error) = self.archive_batch(&batch, &prefix).await;
        let log = match &archive_url {
            Some(url) => {
                let mut active: bulk_transaction_logs::ActiveModel = log.into();
                active.archive_url = Set(Some(url.clone()));
                active.updated_at = Set(now());
                active.update(&self.db).await?
            }
            None => log,
        };
        self.send_summary(&batch, &prefix, &summary).await;

        let outcome = summary.outcome();
        Ok(BulkResult {
            log,
            summary,
            outcome,
            archive_url,
            archive_error,
        })
    }

    async fn archive_batch(
        &self,
        batch: &BulkBatch,
        prefix: &str,
    ) -> (Option<String>, Option<String>) {
        let (Some(archive), Some(csv)) = (&self.archive, &batch.csv) else {
            return (None, None);
        };
        match archive
            .archive_csv(prefix, batch.batch_date, csv.clone())
            .await
        {
            Ok(url) => (Some(url), None),
            Err(err) => {
                warn!(error = %err, "bulk archive upload failed");
                (None, Some(err.to_string()))
            }
        }
    }

    async fn send_summary(&self, batch: &BulkBatch, prefix: &str, summary: &BatchSummary) {
        let Some(mailer) = &self.mailer else { return };

        let operator = members::Entity::find_by_id(batch.recorded_by)
            .one(&self.db)
            .await
            .ok()
            .flatten();
        if let Some(operator) = operator {
            let result = mailer
                .send_bulk_summary(
                    &operator.email,
                    prefix,
                    summary.success_count,
                    summary.error_count,
                )
                .await;
            if let Err(err) = result {
                warn!(error = %err, "bulk summary mail failed");
            }
        }
    }
}

async fn process_row(
    savepoint: &DatabaseTransaction,
    batch: &BulkBatch,
    row: &BulkRow,
    reference: &str,
) -> DbResult<()> {
    let account = accounts::Entity::find()
        .filter(accounts::Column::AccountNumber.eq(row.account_number.clone()))
        .one(savepoint)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("account {}", row.account_number)))?;

    let input = RecordTransaction {
        account_id: account.id,
        amount: row.amount,
        payment_method: row.payment_method,
        currency: Currency::default(),
        transaction_date: batch.batch_date,
        receipt_number: Some(reference.to_string()),
        description: Some(format!("Bulk {} {reference}", batch.kind)),
        recorded_by: batch.recorded_by,
    };

    let repayment_type = match batch.kind {
        TransactionKind::LoanRepayment => Some(RepaymentType::Principal),
        _ => None,
    };

    match batch.kind {
        TransactionKind::SavingsDeposit
        | TransactionKind::VentureDeposit
        | TransactionKind::VenturePayment
        | TransactionKind::FeePayment
        | TransactionKind::LoanRepayment => {
            settle_in_txn(savepoint, batch.kind, input, repayment_type).await?;
            Ok(())
        }
        TransactionKind::SavingsWithdrawal
        | TransactionKind::LoanDisbursement
        | TransactionKind::LoanInterestAccrual => Err(DbError::validation(
            "kind",
            format!("{} is not a bulk-ingestable flow", batch.kind),
        )),
    }
}
