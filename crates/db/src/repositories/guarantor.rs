//! Guarantor profile and capacity ledger.
//!
//! Commitment and release are the only paths that mutate
//! `committed_guarantee_amount`, and both hold a row lock on the profile.
//! The active-guarantee count derives from request status at read time;
//! `max_active_guarantees` is an immutable policy cap.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use tamarind_core::guarantee::capacity;

use super::now;
use crate::entities::{
    guarantee_requests, guarantor_profiles, loan_applications, sea_orm_active_enums as orm,
};
use crate::error::{DbError, DbResult};

/// Application states in which accepted guarantees are live commitments.
pub(crate) const COMMITTED_STATES: [orm::ApplicationStatus; 3] = [
    orm::ApplicationStatus::Submitted,
    orm::ApplicationStatus::Approved,
    orm::ApplicationStatus::Disbursed,
];

/// Repository for guarantor profiles.
#[derive(Debug, Clone)]
pub struct GuarantorRepository {
    db: DatabaseConnection,
}

impl GuarantorRepository {
    /// Creates a new guarantor repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches a profile by id.
    pub async fn get(&self, profile_id: Uuid) -> DbResult<guarantor_profiles::Model> {
        guarantor_profiles::Entity::find_by_id(profile_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("guarantor profile {profile_id}")))
    }

    /// Fetches the profile of a member.
    pub async fn get_by_member(&self, member_id: Uuid) -> DbResult<guarantor_profiles::Model> {
        guarantor_profiles::Entity::find()
            .filter(guarantor_profiles::Column::MemberId.eq(member_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("guarantor profile of member {member_id}")))
    }

    /// Free capacity of a profile.
    pub async fn available_capacity(&self, profile_id: Uuid) -> DbResult<Decimal> {
        let profile = self.get(profile_id).await?;
        Ok(capacity::available_capacity(
            profile.max_guarantee_amount,
            profile.committed_guarantee_amount,
        ))
    }

    /// Count of live guarantees: accepted requests whose application is
    /// submitted, approved, or disbursed. Derived, never stored.
    pub async fn active_guarantees_count(&self, profile_id: Uuid) -> DbResult<u64> {
        Ok(active_guarantees_count(&self.db, profile_id).await?)
    }

    /// Rebuilds every profile's committed amount from live applications.
    ///
    /// Run after the migration that zeroes legacy values: stored
    /// commitments are never trusted, they are replayed from accepted
    /// guarantees on submitted, approved, and disbursed applications.
    #[instrument(skip(self))]
    pub async fn replay_commitments(&self) -> DbResult<u64> {
        let txn = self.db.begin().await?;

        let profiles = guarantor_profiles::Entity::find().all(&txn).await?;
        let mut updated = 0u64;

        for profile in profiles {
            let live = guarantee_requests::Entity::find()
                .filter(guarantee_requests::Column::GuarantorProfileId.eq(profile.id))
                .filter(guarantee_requests::Column::Status.eq(orm::GuaranteeStatus::Accepted))
                .join(
                    JoinType::InnerJoin,
                    guarantee_requests::Relation::LoanApplications.def(),
                )
                .filter(loan_applications::Column::Status.is_in(COMMITTED_STATES))
                .all(&txn)
                .await?;

            let committed: Decimal = live.iter().map(|g| g.outstanding_amount).sum();
            if committed != profile.committed_guarantee_amount {
                let mut active: guarantor_profiles::ActiveModel = profile.into();
                active.committed_guarantee_amount = Set(committed);
                active.updated_at = Set(now());
                active.update(&txn).await?;
                updated += 1;
            }
        }

        txn.commit().await?;
        info!(updated, "replayed guarantor commitments");
        Ok(updated)
    }

    /// Locks and returns a profile row (`SELECT ... FOR UPDATE`).
    pub(crate) async fn lock(
        txn: &DatabaseTransaction,
        profile_id: Uuid,
    ) -> DbResult<guarantor_profiles::Model> {
        guarantor_profiles::Entity::find_by_id(profile_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("guarantor profile {profile_id}")))
    }

    /// Commits capacity on a locked profile. Fails the whole submission
    /// when the commitment would exceed the ceiling.
    pub(crate) async fn commit_capacity(
        txn: &DatabaseTransaction,
        profile: guarantor_profiles::Model,
        amount: Decimal,
    ) -> DbResult<guarantor_profiles::Model> {
        let next = capacity::commit(
            profile.committed_guarantee_amount,
            amount,
            profile.max_guarantee_amount,
        )?;
        let mut active: guarantor_profiles::ActiveModel = profile.into();
        active.committed_guarantee_amount = Set(next);
        active.updated_at = Set(now());
        Ok(active.update(txn).await?)
    }

    /// Releases committed capacity on a locked profile, floored at zero.
    pub(crate) async fn release_capacity(
        txn: &DatabaseTransaction,
        profile: guarantor_profiles::Model,
        amount: Decimal,
    ) -> DbResult<guarantor_profiles::Model> {
        let next = capacity::release(profile.committed_guarantee_amount, amount);
        let mut active: guarantor_profiles::ActiveModel = profile.into();
        active.committed_guarantee_amount = Set(next);
        active.updated_at = Set(now());
        Ok(active.update(txn).await?)
    }
}

/// Derived live-guarantee count for a profile.
pub(crate) async fn active_guarantees_count<C: sea_orm::ConnectionTrait>(
    conn: &C,
    profile_id: Uuid,
) -> Result<u64, sea_orm::DbErr> {
    guarantee_requests::Entity::find()
        .filter(guarantee_requests::Column::GuarantorProfileId.eq(profile_id))
        .filter(guarantee_requests::Column::Status.eq(orm::GuaranteeStatus::Accepted))
        .join(
            JoinType::InnerJoin,
            guarantee_requests::Relation::LoanApplications.def(),
        )
        .filter(loan_applications::Column::Status.is_in(COMMITTED_STATES))
        .count(conn)
        .await
}
