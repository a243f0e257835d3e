//! Balance-mutation engine.
//!
//! Records each domain transaction and, in the same database transaction:
//! assigns the daily identity, applies the signed balance delta through
//! the account registry, and posts the balanced journal. Loan repayments
//! additionally trigger proportional guarantee release.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set,
    TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use tamarind_core::catalog::{FeeClassification, ProductKind};
use tamarind_core::transaction::{
    RepaymentType, TransactionKind, TransactionStatus, validate_amount,
    validate_withdrawal_transition,
};
use tamarind_shared::types::money::Currency;

use super::account::{AccountRepository, AdjustTarget};
use super::guarantee_request::apply_repayment_release;
use super::journal::{JournalRepository, PostJournal, fee_event_code};
use super::{ident, now};
use crate::entities::{
    accounts, member_fees, product_types, sea_orm_active_enums as orm, transactions,
};
use crate::error::{DbError, DbResult};

/// Input for recording a domain transaction.
#[derive(Debug, Clone)]
pub struct RecordTransaction {
    /// Target product account.
    pub account_id: Uuid,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Payment method.
    pub payment_method: tamarind_core::transaction::PaymentMethod,
    /// Currency label. No conversion takes place.
    pub currency: Currency,
    /// Civil date of the transaction.
    pub transaction_date: NaiveDate,
    /// Optional receipt number.
    pub receipt_number: Option<String>,
    /// Optional description for the journal.
    pub description: Option<String>,
    /// Operator recording the transaction.
    pub recorded_by: Uuid,
}

/// Engine recording domain transactions atomically with their balance
/// and ledger effects.
#[derive(Debug, Clone)]
pub struct TransactionEngine {
    db: DatabaseConnection,
}

impl TransactionEngine {
    /// Creates a new transaction engine.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a settled savings deposit.
    #[instrument(skip(self, input), fields(account = %input.account_id))]
    pub async fn record_savings_deposit(
        &self,
        input: RecordTransaction,
    ) -> DbResult<transactions::Model> {
        self.settle(TransactionKind::SavingsDeposit, input, None).await
    }

    /// Records a member withdrawal request. No balance or ledger effect
    /// until an administrator settles it.
    #[instrument(skip(self, input), fields(account = %input.account_id))]
    pub async fn request_savings_withdrawal(
        &self,
        input: RecordTransaction,
    ) -> DbResult<transactions::Model> {
        validate_amount(input.amount)?;
        let txn = self.db.begin().await?;

        let account = AccountRepository::lock(&txn, input.account_id).await?;
        expect_kind(&account, ProductKind::Savings)?;
        if input.amount > account.balance {
            return Err(DbError::validation(
                "amount",
                format!("withdrawal of {} exceeds balance {}", input.amount, account.balance),
            ));
        }

        let row = insert_transaction_row(
            &txn,
            TransactionKind::SavingsWithdrawal,
            TransactionStatus::Processing,
            &input,
            None,
        )
        .await?;

        txn.commit().await?;
        Ok(row)
    }

    /// Settles a processing withdrawal: `approve` completes it (balance
    /// and ledger mutate), otherwise it is rejected with no effect.
    #[instrument(skip(self))]
    pub async fn settle_withdrawal(
        &self,
        transaction_id: Uuid,
        approve: bool,
    ) -> DbResult<transactions::Model> {
        let txn = self.db.begin().await?;

        let row = transactions::Entity::find_by_id(transaction_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("transaction {transaction_id}")))?;
        if row.kind != orm::TransactionKind::SavingsWithdrawal {
            return Err(DbError::State("not a withdrawal request".to_string()));
        }

        let target = if approve {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Rejected
        };
        validate_withdrawal_transition(row.status.into(), target)?;

        if approve {
            let account = AccountRepository::lock(&txn, row.account_id).await?;
            if row.amount > account.balance {
                return Err(DbError::validation(
                    "amount",
                    format!("withdrawal of {} exceeds balance {}", row.amount, account.balance),
                ));
            }
            AccountRepository::adjust(&txn, account.id, -row.amount, AdjustTarget::Balance)
                .await?;
            JournalRepository::post(
                &txn,
                PostJournal {
                    event_code: "savings_withdrawal".to_string(),
                    fee_classification: None,
                    amount: row.amount,
                    transaction_date: row.transaction_date,
                    description: row
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("Savings withdrawal {}", row.identity)),
                    source_model: "transaction".to_string(),
                    reference_id: row.id,
                    posted_by: row.recorded_by,
                },
            )
            .await?;
        }

        let mut active: transactions::ActiveModel = row.into();
        active.status = Set(target.into());
        active.updated_at = Set(now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Records a settled venture deposit.
    #[instrument(skip(self, input), fields(account = %input.account_id))]
    pub async fn record_venture_deposit(
        &self,
        input: RecordTransaction,
    ) -> DbResult<transactions::Model> {
        self.settle(TransactionKind::VentureDeposit, input, None).await
    }

    /// Records a settled venture payout.
    #[instrument(skip(self, input), fields(account = %input.account_id))]
    pub async fn record_venture_payment(
        &self,
        input: RecordTransaction,
    ) -> DbResult<transactions::Model> {
        self.settle(TransactionKind::VenturePayment, input, None).await
    }

    /// Records a settled fee payment, updating the member's fee record.
    #[instrument(skip(self, input), fields(account = %input.account_id))]
    pub async fn record_fee_payment(
        &self,
        input: RecordTransaction,
    ) -> DbResult<transactions::Model> {
        self.settle(TransactionKind::FeePayment, input, None).await
    }

    /// Records a settled loan repayment. Principal repayments reduce the
    /// outstanding balance; interest payments reduce accrued interest.
    #[instrument(skip(self, input), fields(account = %input.account_id))]
    pub async fn record_loan_repayment(
        &self,
        input: RecordTransaction,
        repayment_type: RepaymentType,
    ) -> DbResult<transactions::Model> {
        self.settle(TransactionKind::LoanRepayment, input, Some(repayment_type))
            .await
    }

    /// Records an operator-entered interest accrual on a loan account.
    #[instrument(skip(self, input), fields(account = %input.account_id))]
    pub async fn record_loan_interest_accrual(
        &self,
        input: RecordTransaction,
    ) -> DbResult<transactions::Model> {
        self.settle(TransactionKind::LoanInterestAccrual, input, None).await
    }

    async fn settle(
        &self,
        kind: TransactionKind,
        input: RecordTransaction,
        repayment_type: Option<RepaymentType>,
    ) -> DbResult<transactions::Model> {
        let txn = self.db.begin().await?;
        let row = settle_in_txn(&txn, kind, input, repayment_type).await?;
        txn.commit().await?;
        Ok(row)
    }

    /// Records a loan disbursement inside the caller's transaction. Used
    /// by the loan application workflow.
    pub(crate) async fn disburse_loan(
        txn: &DatabaseTransaction,
        input: RecordTransaction,
    ) -> DbResult<transactions::Model> {
        settle_in_txn(txn, TransactionKind::LoanDisbursement, input, None).await
    }
}

/// The product kind a transaction kind targets.
const fn target_kind(kind: TransactionKind) -> ProductKind {
    match kind {
        TransactionKind::SavingsDeposit | TransactionKind::SavingsWithdrawal => {
            ProductKind::Savings
        }
        TransactionKind::VentureDeposit | TransactionKind::VenturePayment => ProductKind::Venture,
        TransactionKind::LoanDisbursement
        | TransactionKind::LoanRepayment
        | TransactionKind::LoanInterestAccrual => ProductKind::Loan,
        TransactionKind::FeePayment => ProductKind::Fee,
    }
}

fn expect_kind(account: &accounts::Model, expected: ProductKind) -> DbResult<()> {
    let actual: ProductKind = account.kind.into();
    if actual == expected {
        Ok(())
    } else {
        Err(DbError::validation(
            "account",
            format!("expected a {expected} account, got {actual}"),
        ))
    }
}

async fn insert_transaction_row(
    txn: &DatabaseTransaction,
    kind: TransactionKind,
    status: TransactionStatus,
    input: &RecordTransaction,
    repayment_type: Option<RepaymentType>,
) -> DbResult<transactions::Model> {
    let identity =
        ident::next_daily_identity(txn, kind.identity_prefix(), input.transaction_date).await?;
    let timestamp = now();

    Ok(transactions::ActiveModel {
        id: Set(Uuid::now_v7()),
        account_id: Set(input.account_id),
        kind: Set(kind.into()),
        amount: Set(input.amount),
        payment_method: Set(input.payment_method.into()),
        currency: Set(input.currency.to_string()),
        status: Set(status.into()),
        repayment_type: Set(repayment_type.map(Into::into)),
        receipt_number: Set(input.receipt_number.clone()),
        description: Set(input.description.clone()),
        identity: Set(identity),
        transaction_date: Set(input.transaction_date),
        recorded_by: Set(input.recorded_by),
        reference: Set(tamarind_core::ident::generate_reference()),
        created_at: Set(timestamp),
        updated_at: Set(timestamp),
    }
    .insert(txn)
    .await?)
}

/// Settles a transaction inside an open database transaction: row,
/// balance delta, journal, and kind-specific side effects.
pub(crate) async fn settle_in_txn(
    txn: &DatabaseTransaction,
    kind: TransactionKind,
    input: RecordTransaction,
    repayment_type: Option<RepaymentType>,
) -> DbResult<transactions::Model> {
    validate_amount(input.amount)?;

    let account = AccountRepository::lock(txn, input.account_id).await?;
    expect_kind(&account, target_kind(kind))?;

    // Outflows cannot exceed what the account holds.
    match (kind, repayment_type) {
        (TransactionKind::SavingsWithdrawal | TransactionKind::VenturePayment, _) => {
            if input.amount > account.balance {
                return Err(DbError::validation(
                    "amount",
                    format!("{} exceeds balance {}", input.amount, account.balance),
                ));
            }
        }
        (TransactionKind::LoanRepayment, Some(RepaymentType::InterestPayment)) => {
            let accrued = account.interest_accrued.unwrap_or(Decimal::ZERO);
            if input.amount > accrued {
                return Err(DbError::validation(
                    "amount",
                    format!("{} exceeds accrued interest {accrued}", input.amount),
                ));
            }
        }
        (TransactionKind::LoanRepayment, _) => {
            if input.amount > account.balance {
                return Err(DbError::validation(
                    "amount",
                    format!("{} exceeds outstanding balance {}", input.amount, account.balance),
                ));
            }
        }
        _ => {}
    }

    let row = insert_transaction_row(txn, kind, TransactionStatus::Completed, &input, repayment_type)
        .await?;

    // Apply the signed delta to the right figure.
    match (kind, repayment_type) {
        (TransactionKind::LoanInterestAccrual, _) => {
            AccountRepository::adjust(txn, account.id, input.amount, AdjustTarget::InterestAccrued)
                .await?;
        }
        (TransactionKind::LoanRepayment, Some(RepaymentType::InterestPayment)) => {
            AccountRepository::adjust(txn, account.id, -input.amount, AdjustTarget::InterestAccrued)
                .await?;
        }
        _ => {
            AccountRepository::adjust(
                txn,
                account.id,
                kind.signed_delta(input.amount),
                AdjustTarget::Balance,
            )
            .await?;
        }
    }

    // Resolve the posting event; fee payments credit per classification.
    let event = kind.posting_event(repayment_type);
    let (event_code, fee_classification) = if kind == TransactionKind::FeePayment {
        let fee_type = product_types::Entity::find_by_id(account.product_type_id)
            .one(txn)
            .await?
            .ok_or_else(|| DbError::NotFound("fee product type".to_string()))?;
        let classification: FeeClassification = fee_type
            .fee_classification
            .map_or(FeeClassification::Income, Into::into);
        update_member_fee(txn, &account, &fee_type, input.amount).await?;
        (fee_event_code(&fee_type.name), Some(classification))
    } else {
        (event.code().to_string(), None)
    };

    JournalRepository::post(
        txn,
        PostJournal {
            event_code,
            fee_classification,
            amount: input.amount,
            transaction_date: input.transaction_date,
            description: input
                .description
                .clone()
                .unwrap_or_else(|| format!("{kind} {}", row.identity)),
            source_model: "transaction".to_string(),
            reference_id: row.id,
            posted_by: input.recorded_by,
        },
    )
    .await?;

    if kind == TransactionKind::LoanRepayment {
        apply_repayment_release(txn, account.id, input.amount).await?;
    }

    Ok(row)
}

/// Accumulates a fee payment into the member's fee record; `is_paid`
/// flips once payments cover the fee type's standard amount.
async fn update_member_fee(
    txn: &DatabaseTransaction,
    account: &accounts::Model,
    fee_type: &product_types::Model,
    amount: Decimal,
) -> DbResult<()> {
    use sea_orm::{ColumnTrait, QueryFilter, QuerySelect};

    let existing = member_fees::Entity::find()
        .filter(member_fees::Column::MemberId.eq(account.member_id))
        .filter(member_fees::Column::ProductTypeId.eq(fee_type.id))
        .lock_exclusive()
        .one(txn)
        .await?;

    let timestamp = now();
    match existing {
        Some(fee) => {
            let paid = fee.amount_paid + amount;
            let mut active: member_fees::ActiveModel = fee.into();
            active.amount_paid = Set(paid);
            active.is_paid = Set(fee_type.standard_amount.is_some_and(|standard| paid >= standard));
            active.updated_at = Set(timestamp);
            active.update(txn).await?;
        }
        None => {
            member_fees::ActiveModel {
                id: Set(Uuid::now_v7()),
                member_id: Set(account.member_id),
                product_type_id: Set(fee_type.id),
                amount_paid: Set(amount),
                is_paid: Set(fee_type.standard_amount.is_some_and(|standard| amount >= standard)),
                reference: Set(tamarind_core::ident::generate_reference()),
                created_at: Set(timestamp),
                updated_at: Set(timestamp),
            }
            .insert(txn)
            .await?;
        }
    }
    Ok(())
}
