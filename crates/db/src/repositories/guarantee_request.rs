//! Guarantee request engine.
//!
//! Requests are created by the applicant, answered by the guarantor while
//! the application is pre-submission, committed at submission, and
//! released proportionally as the loan repays.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use tamarind_core::guarantee::{GuaranteeError, GuaranteeStatus, capacity, release, request};
use tamarind_core::loan::{ApplicationStatus, LoanWorkflow};
use tamarind_shared::email::Mailer;

use super::guarantor::GuarantorRepository;
use super::loan_application::compute_coverage;
use super::now;
use crate::entities::{
    guarantee_requests, guarantor_profiles, loan_applications, members,
    sea_orm_active_enums as orm,
};
use crate::error::{DbError, DbResult};

/// Input for creating a guarantee request.
#[derive(Debug, Clone)]
pub struct NewGuaranteeRequest {
    /// The loan application to cover.
    pub loan_application_id: Uuid,
    /// The member being asked to guarantee.
    pub guarantor_member_id: Uuid,
    /// Optional note to the guarantor.
    pub note: Option<String>,
}

/// Repository for guarantee requests.
#[derive(Clone)]
pub struct GuaranteeRequestRepository {
    db: DatabaseConnection,
    mailer: Option<Mailer>,
}

impl GuaranteeRequestRepository {
    /// Creates a new guarantee request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, mailer: None }
    }

    /// Attaches a mailer for post-commit notifications.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Fetches a request by id.
    pub async fn get(&self, request_id: Uuid) -> DbResult<guarantee_requests::Model> {
        guarantee_requests::Entity::find_by_id(request_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("guarantee request {request_id}")))
    }

    /// Lists the requests of an application.
    pub async fn list_for_application(
        &self,
        loan_application_id: Uuid,
    ) -> DbResult<Vec<guarantee_requests::Model>> {
        Ok(guarantee_requests::Entity::find()
            .filter(guarantee_requests::Column::LoanApplicationId.eq(loan_application_id))
            .order_by_asc(guarantee_requests::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Lists the requests addressed to a guarantor profile.
    pub async fn list_for_guarantor(
        &self,
        guarantor_profile_id: Uuid,
    ) -> DbResult<Vec<guarantee_requests::Model>> {
        Ok(guarantee_requests::Entity::find()
            .filter(guarantee_requests::Column::GuarantorProfileId.eq(guarantor_profile_id))
            .order_by_asc(guarantee_requests::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Creates a pending request from the application owner to another
    /// member's profile.
    #[instrument(skip(self, input), fields(application = %input.loan_application_id))]
    pub async fn create(
        &self,
        input: NewGuaranteeRequest,
        acting_member: Uuid,
    ) -> DbResult<guarantee_requests::Model> {
        let txn = self.db.begin().await?;

        let application = loan_applications::Entity::find_by_id(input.loan_application_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DbError::NotFound(format!("loan application {}", input.loan_application_id))
            })?;

        if application.member_id != acting_member {
            return Err(DbError::Forbidden(
                "only the applicant can request guarantees".to_string(),
            ));
        }
        let status: ApplicationStatus = application.status.into();
        if !status.is_pre_submission() {
            return Err(GuaranteeError::ApplicationNotOpen(status.to_string()).into());
        }
        if input.guarantor_member_id == application.member_id {
            return Err(DbError::validation(
                "guarantor",
                "own savings are pledged via the self-guarantee, not a request",
            ));
        }

        let profile = guarantor_profiles::Entity::find()
            .filter(guarantor_profiles::Column::MemberId.eq(input.guarantor_member_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DbError::NotFound(format!(
                    "guarantor profile of member {}",
                    input.guarantor_member_id
                ))
            })?;

        let duplicate = guarantee_requests::Entity::find()
            .filter(guarantee_requests::Column::LoanApplicationId.eq(application.id))
            .filter(guarantee_requests::Column::GuarantorProfileId.eq(profile.id))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            return Err(GuaranteeError::Duplicate.into());
        }

        let timestamp = now();
        let created = guarantee_requests::ActiveModel {
            id: Set(Uuid::now_v7()),
            loan_application_id: Set(application.id),
            guarantor_profile_id: Set(profile.id),
            guaranteed_amount: Set(Decimal::ZERO),
            outstanding_amount: Set(Decimal::ZERO),
            status: Set(orm::GuaranteeStatus::Pending),
            note: Set(input.note),
            is_self: Set(false),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        self.notify_guarantor(&created, &application).await;
        Ok(created)
    }

    /// Guarantor accepts a request with an amount. A paper capacity check
    /// only; commitment is deferred to submission.
    #[instrument(skip(self), fields(request = %request_id))]
    pub async fn accept(
        &self,
        request_id: Uuid,
        acting_member: Uuid,
        amount: Decimal,
        note: Option<String>,
    ) -> DbResult<guarantee_requests::Model> {
        let txn = self.db.begin().await?;

        let (row, application, profile) = self.load_for_answer(&txn, request_id).await?;
        if profile.member_id != acting_member {
            return Err(DbError::Forbidden(
                "only the requested guarantor can answer".to_string(),
            ));
        }
        request::validate_answer(row.status.into(), GuaranteeStatus::Accepted)?;

        capacity::check_acceptance(
            amount,
            profile.max_guarantee_amount,
            profile.committed_guarantee_amount,
            profile.is_eligible,
        )?;

        let live = super::guarantor::active_guarantees_count(&txn, profile.id).await?;
        if live >= u64::try_from(profile.max_active_guarantees).unwrap_or(0) {
            return Err(DbError::validation(
                "guarantor",
                format!(
                    "already carries {live} live guarantees of a permitted {}",
                    profile.max_active_guarantees
                ),
            ));
        }

        let mut active: guarantee_requests::ActiveModel = row.into();
        active.guaranteed_amount = Set(amount);
        active.status = Set(orm::GuaranteeStatus::Accepted);
        if let Some(note) = note {
            active.note = Set(Some(note));
        }
        active.updated_at = Set(now());
        let updated = active.update(&txn).await?;

        // Full coverage moves an in-progress application forward.
        let coverage = compute_coverage(&txn, &application).await?;
        let app_status: ApplicationStatus = application.status.into();
        if coverage.is_fully_covered && app_status == ApplicationStatus::InProgress {
            let next = LoanWorkflow::mark_ready_for_submission(app_status)?;
            let mut app_active: loan_applications::ActiveModel = application.into();
            app_active.status = Set(next.into());
            app_active.updated_at = Set(now());
            app_active.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Guarantor declines a request.
    #[instrument(skip(self), fields(request = %request_id))]
    pub async fn decline(
        &self,
        request_id: Uuid,
        acting_member: Uuid,
        note: Option<String>,
    ) -> DbResult<guarantee_requests::Model> {
        let txn = self.db.begin().await?;

        let (row, _application, profile) = self.load_for_answer(&txn, request_id).await?;
        if profile.member_id != acting_member {
            return Err(DbError::Forbidden(
                "only the requested guarantor can answer".to_string(),
            ));
        }
        request::validate_answer(row.status.into(), GuaranteeStatus::Declined)?;

        let mut active: guarantee_requests::ActiveModel = row.into();
        active.status = Set(orm::GuaranteeStatus::Declined);
        active.guaranteed_amount = Set(Decimal::ZERO);
        if let Some(note) = note {
            active.note = Set(Some(note));
        }
        active.updated_at = Set(now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn load_for_answer(
        &self,
        txn: &DatabaseTransaction,
        request_id: Uuid,
    ) -> DbResult<(
        guarantee_requests::Model,
        loan_applications::Model,
        guarantor_profiles::Model,
    )> {
        let row = guarantee_requests::Entity::find_by_id(request_id)
            .one(txn)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("guarantee request {request_id}")))?;

        let application = loan_applications::Entity::find_by_id(row.loan_application_id)
            .one(txn)
            .await?
            .ok_or_else(|| DbError::NotFound("loan application".to_string()))?;
        let status: ApplicationStatus = application.status.into();
        if !status.is_pre_submission() {
            return Err(GuaranteeError::ApplicationNotOpen(status.to_string()).into());
        }

        let profile = guarantor_profiles::Entity::find_by_id(row.guarantor_profile_id)
            .one(txn)
            .await?
            .ok_or_else(|| DbError::NotFound("guarantor profile".to_string()))?;

        Ok((row, application, profile))
    }

    async fn notify_guarantor(
        &self,
        request: &guarantee_requests::Model,
        application: &loan_applications::Model,
    ) {
        let Some(mailer) = &self.mailer else { return };

        let guarantor = guarantor_profiles::Entity::find_by_id(request.guarantor_profile_id)
            .find_also_related(members::Entity)
            .one(&self.db)
            .await
            .ok()
            .flatten()
            .and_then(|(_, member)| member);
        let applicant = members::Entity::find_by_id(application.member_id)
            .one(&self.db)
            .await
            .ok()
            .flatten();

        if let (Some(guarantor), Some(applicant)) = (guarantor, applicant) {
            let result = mailer
                .send_guarantee_requested(
                    &guarantor.email,
                    &guarantor.first_name,
                    &format!("{} {}", applicant.first_name, applicant.last_name),
                    &application.requested_amount.to_string(),
                )
                .await;
            if let Err(err) = result {
                warn!(error = %err, "guarantee request mail failed");
            }
        }
    }
}

/// Applies proportional guarantee release after a loan repayment.
///
/// Locates the most recent disbursed application of the loan account and
/// reduces each accepted guarantee's running balance, and its guarantor's
/// committed amount, by the repaid share. Runs inside the repayment's
/// transaction; profiles are locked in id order.
pub(crate) async fn apply_repayment_release(
    txn: &DatabaseTransaction,
    loan_account_id: Uuid,
    repayment_amount: Decimal,
) -> DbResult<()> {
    let Some(application) = loan_applications::Entity::find()
        .filter(loan_applications::Column::LoanAccountId.eq(loan_account_id))
        .filter(loan_applications::Column::Status.eq(orm::ApplicationStatus::Disbursed))
        .order_by_desc(loan_applications::Column::UpdatedAt)
        .one(txn)
        .await?
    else {
        // Repayment against a loan that predates the application
        // workflow; nothing to release.
        return Ok(());
    };

    let mut guarantees = guarantee_requests::Entity::find()
        .filter(guarantee_requests::Column::LoanApplicationId.eq(application.id))
        .filter(guarantee_requests::Column::Status.eq(orm::GuaranteeStatus::Accepted))
        .all(txn)
        .await?;
    guarantees.sort_by_key(|g| g.guarantor_profile_id);

    for guarantee in guarantees {
        let profile = GuarantorRepository::lock(txn, guarantee.guarantor_profile_id).await?;
        let deltas = release::proportional_release(
            repayment_amount,
            application.requested_amount,
            &[release::GuaranteeShare {
                guaranteed_amount: guarantee.guaranteed_amount,
                outstanding_amount: guarantee.outstanding_amount,
                committed_amount: profile.committed_guarantee_amount,
            }],
        );
        let delta = deltas[0];

        let mut active: guarantee_requests::ActiveModel = guarantee.into();
        active.outstanding_amount = Set(delta.new_outstanding);
        active.updated_at = Set(now());
        active.update(txn).await?;

        GuarantorRepository::release_capacity(txn, profile, delta.delta).await?;
    }

    Ok(())
}
