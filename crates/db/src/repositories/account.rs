//! Member account registry.
//!
//! `adjust` is the only authorized writer of `balance` and
//! `interest_accrued`. Every adjustment runs inside the caller's
//! transaction, under a row lock, together with its ledger posting.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use tamarind_core::catalog::ProductKind;

use super::{ident, now};
use crate::entities::{accounts, guarantor_profiles, product_types, sea_orm_active_enums};
use crate::error::{DbError, DbResult};

/// Which stored figure an adjustment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustTarget {
    /// The account balance (outstanding balance for loans).
    Balance,
    /// Accrued interest (loan accounts only).
    InterestAccrued,
}

/// Repository for member product accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches an account by id.
    pub async fn get(&self, account_id: Uuid) -> DbResult<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("account {account_id}")))
    }

    /// Fetches an account by its type-prefixed number.
    pub async fn find_by_number(&self, account_number: &str) -> DbResult<accounts::Model> {
        accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(account_number))
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("account {account_number}")))
    }

    /// Current balance of an account.
    pub async fn balance(&self, account_id: Uuid) -> DbResult<Decimal> {
        Ok(self.get(account_id).await?.balance)
    }

    /// Lists a member's accounts.
    pub async fn list_for_member(&self, member_id: Uuid) -> DbResult<Vec<accounts::Model>> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::MemberId.eq(member_id))
            .all(&self.db)
            .await?)
    }

    /// Fetches or provisions the account of (member, product type).
    ///
    /// Idempotent: re-running never duplicates. Returns the account and
    /// whether it was created by this call.
    pub async fn get_or_create(
        txn: &DatabaseTransaction,
        member_id: Uuid,
        product_type: &product_types::Model,
        today: NaiveDate,
    ) -> DbResult<(accounts::Model, bool)> {
        if let Some(existing) = accounts::Entity::find()
            .filter(accounts::Column::MemberId.eq(member_id))
            .filter(accounts::Column::ProductTypeId.eq(product_type.id))
            .one(txn)
            .await?
        {
            return Ok((existing, false));
        }

        let kind: ProductKind = product_type.kind.into();
        let account_number = ident::unique_account_number(txn, kind, today).await?;
        let is_loan = kind == ProductKind::Loan;
        let timestamp = now();

        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            member_id: Set(member_id),
            product_type_id: Set(product_type.id),
            kind: Set(product_type.kind),
            account_number: Set(account_number),
            balance: Set(Decimal::ZERO),
            interest_accrued: Set(is_loan.then_some(Decimal::ZERO)),
            last_interest_calculation: Set(None),
            is_active: Set(true),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(txn)
        .await?;

        Ok((account, true))
    }

    /// Locks and returns an account row (`SELECT ... FOR UPDATE`).
    pub(crate) async fn lock(
        txn: &DatabaseTransaction,
        account_id: Uuid,
    ) -> DbResult<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("account {account_id}")))
    }

    /// Applies a signed delta to an account figure under a row lock.
    ///
    /// Enforces non-negative balances, deactivates loan accounts whose
    /// outstanding balance reaches zero, reactivates them on disbursement,
    /// and recomputes the owner's guarantee ceiling on savings mutations.
    pub(crate) async fn adjust(
        txn: &DatabaseTransaction,
        account_id: Uuid,
        delta: Decimal,
        target: AdjustTarget,
    ) -> DbResult<accounts::Model> {
        let account = Self::lock(txn, account_id).await?;
        let kind: ProductKind = account.kind.into();
        let member_id = account.member_id;
        let balance = account.balance;
        let accrued = account.interest_accrued.unwrap_or(Decimal::ZERO);

        let mut active: accounts::ActiveModel = account.into();

        match target {
            AdjustTarget::Balance => {
                let next = balance + delta;
                if next < Decimal::ZERO {
                    return Err(DbError::Integrity(format!(
                        "adjustment of {delta} would leave account balance negative"
                    )));
                }
                active.balance = Set(next);
                if kind == ProductKind::Loan {
                    // Outstanding at zero means the loan is retired.
                    active.is_active = Set(!next.is_zero());
                }
            }
            AdjustTarget::InterestAccrued => {
                if kind != ProductKind::Loan {
                    return Err(DbError::Integrity(
                        "interest accrual targets loan accounts only".to_string(),
                    ));
                }
                let next = accrued + delta;
                if next < Decimal::ZERO {
                    return Err(DbError::Integrity(format!(
                        "adjustment of {delta} would leave accrued interest negative"
                    )));
                }
                active.interest_accrued = Set(Some(next));
                if delta > Decimal::ZERO {
                    active.last_interest_calculation = Set(Some(now()));
                }
            }
        }

        active.updated_at = Set(now());
        let updated = active.update(txn).await?;

        if kind == ProductKind::Savings && target == AdjustTarget::Balance {
            recompute_guarantee_ceiling(txn, member_id).await?;
        }

        Ok(updated)
    }
}

/// Re-derives a member's `max_guarantee_amount` from their savings
/// balances. Runs in the same transaction as the savings mutation.
pub(crate) async fn recompute_guarantee_ceiling<C: ConnectionTrait>(
    conn: &C,
    member_id: Uuid,
) -> DbResult<()> {
    let savings = accounts::Entity::find()
        .filter(accounts::Column::MemberId.eq(member_id))
        .filter(accounts::Column::Kind.eq(sea_orm_active_enums::ProductKind::Savings))
        .all(conn)
        .await?;
    let total: Decimal = savings.iter().map(|a| a.balance).sum();

    let Some(profile) = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(member_id))
        .one(conn)
        .await?
    else {
        // Members provisioned before guarantor profiles existed.
        return Ok(());
    };

    // Savings pledged as guarantee commitments cannot be drawn down.
    if total < profile.committed_guarantee_amount {
        return Err(DbError::Integrity(format!(
            "savings of {total} would fall below committed guarantees of {}",
            profile.committed_guarantee_amount
        )));
    }

    let mut active: guarantor_profiles::ActiveModel = profile.into();
    active.max_guarantee_amount = Set(total);
    active.updated_at = Set(now());
    active.update(conn).await?;
    Ok(())
}
