//! Loan application workflow.
//!
//! Transition rules live in `tamarind_core::loan::state`; this repository
//! adds the persistence side: projection snapshots, coverage queries,
//! ordered-lock commitment at submission, commitment reversal on decline,
//! and the disbursement posting.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use tamarind_core::catalog::ProductKind;
use tamarind_core::loan::{
    ApplicationStatus, CalculationMode, Coverage, CoverageInputs, LoanWorkflow, Projection,
    RepaymentFrequency, WorkflowError, fixed_payment, fixed_term,
};
use tamarind_core::transaction::PaymentMethod;
use tamarind_shared::email::Mailer;
use tamarind_shared::types::money::Currency;

use super::guarantor::{COMMITTED_STATES, GuarantorRepository};
use super::now;
use super::transaction::{RecordTransaction, TransactionEngine};
use crate::entities::{
    accounts, guarantee_requests, guarantor_profiles, loan_applications, members, product_types,
    sea_orm_active_enums as orm,
};
use crate::error::{DbError, DbResult};

/// Input for creating a loan application.
#[derive(Debug, Clone)]
pub struct NewLoanApplication {
    /// The applying member.
    pub member_id: Uuid,
    /// The loan product.
    pub product_type_id: Uuid,
    /// Requested principal.
    pub requested_amount: Decimal,
    /// Projection mode.
    pub calculation_mode: CalculationMode,
    /// Term in months (fixed-term mode).
    pub term_months: Option<u32>,
    /// Monthly payment (fixed-payment mode).
    pub monthly_payment: Option<Decimal>,
    /// Repayment cadence.
    pub repayment_frequency: RepaymentFrequency,
    /// First repayment anchor date.
    pub start_date: NaiveDate,
}

/// Amendment input; every set field touches the projection.
#[derive(Debug, Clone, Default)]
pub struct AmendLoanApplication {
    /// New requested principal.
    pub requested_amount: Option<Decimal>,
    /// New projection mode.
    pub calculation_mode: Option<CalculationMode>,
    /// New term in months.
    pub term_months: Option<u32>,
    /// New monthly payment.
    pub monthly_payment: Option<Decimal>,
    /// New loan product.
    pub product_type_id: Option<Uuid>,
    /// New start date.
    pub start_date: Option<NaiveDate>,
    /// New repayment cadence.
    pub repayment_frequency: Option<RepaymentFrequency>,
}

/// Repository for loan applications.
#[derive(Clone)]
pub struct LoanApplicationRepository {
    db: DatabaseConnection,
    mailer: Option<Mailer>,
}

impl LoanApplicationRepository {
    /// Creates a new loan application repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, mailer: None }
    }

    /// Attaches a mailer for post-commit decision notifications.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Mailer) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Fetches an application by id.
    pub async fn get(&self, application_id: Uuid) -> DbResult<loan_applications::Model> {
        loan_applications::Entity::find_by_id(application_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("loan application {application_id}")))
    }

    /// Lists a member's applications.
    pub async fn list_for_member(
        &self,
        member_id: Uuid,
    ) -> DbResult<Vec<loan_applications::Model>> {
        Ok(loan_applications::Entity::find()
            .filter(loan_applications::Column::MemberId.eq(member_id))
            .order_by_desc(loan_applications::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Creates an application with its projection snapshot.
    #[instrument(skip(self, input), fields(member = %input.member_id))]
    pub async fn create(
        &self,
        input: NewLoanApplication,
        acting_member: Uuid,
    ) -> DbResult<loan_applications::Model> {
        if input.member_id != acting_member {
            return Err(DbError::Forbidden(
                "members apply for their own loans".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = product_types::Entity::find_by_id(input.product_type_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("product type {}", input.product_type_id)))?;
        if ProductKind::from(product.kind) != ProductKind::Loan || !product.is_active {
            return Err(DbError::validation("product", "not an active loan product"));
        }

        let projection = compute_projection(
            &product,
            input.requested_amount,
            input.calculation_mode,
            input.term_months,
            input.monthly_payment,
            input.start_date,
            input.repayment_frequency,
        )?;

        let timestamp = now();
        let created = loan_applications::ActiveModel {
            id: Set(Uuid::now_v7()),
            member_id: Set(input.member_id),
            product_type_id: Set(product.id),
            requested_amount: Set(input.requested_amount),
            calculation_mode: Set(input.calculation_mode.into()),
            term_months: Set(i32::try_from(projection.term_months).unwrap_or(i32::MAX)),
            monthly_payment: Set(projection.monthly_payment),
            total_interest: Set(projection.total_interest),
            repayment_amount: Set(projection.total_repayment),
            repayment_frequency: Set(input.repayment_frequency.into()),
            start_date: Set(input.start_date),
            projection: Set(serde_json::to_value(&projection)
                .map_err(|e| DbError::Integrity(e.to_string()))?),
            self_guaranteed_amount: Set(Decimal::ZERO),
            loan_account_id: Set(None),
            status: Set(orm::ApplicationStatus::Pending),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(created)
    }

    /// Member hands a pending application to an administrator.
    #[instrument(skip(self))]
    pub async fn submit_for_amendment(
        &self,
        application_id: Uuid,
        acting_member: Uuid,
    ) -> DbResult<loan_applications::Model> {
        let txn = self.db.begin().await?;
        let application = lock_application(&txn, application_id).await?;
        require_owner(&application, acting_member)?;

        let next = LoanWorkflow::submit_for_amendment(application.status.into())?;
        let updated = set_status(&txn, application, next).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Administrator amends the application; the projection recomputes
    /// whenever any projection input changes.
    #[instrument(skip(self, changes))]
    pub async fn amend(
        &self,
        application_id: Uuid,
        acting_admin: Uuid,
        changes: AmendLoanApplication,
    ) -> DbResult<loan_applications::Model> {
        let txn = self.db.begin().await?;
        require_admin(&txn, acting_admin).await?;

        let application = lock_application(&txn, application_id).await?;
        let next = LoanWorkflow::amend(application.status.into())?;

        let requested_amount = changes
            .requested_amount
            .unwrap_or(application.requested_amount);
        let calculation_mode: CalculationMode = changes
            .calculation_mode
            .unwrap_or_else(|| application.calculation_mode.into());
        let term_months = changes
            .term_months
            .or_else(|| u32::try_from(application.term_months).ok());
        let monthly_payment = changes.monthly_payment.or(Some(application.monthly_payment));
        let product_type_id = changes.product_type_id.unwrap_or(application.product_type_id);
        let start_date = changes.start_date.unwrap_or(application.start_date);
        let repayment_frequency: RepaymentFrequency = changes
            .repayment_frequency
            .unwrap_or_else(|| application.repayment_frequency.into());

        let product = product_types::Entity::find_by_id(product_type_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("product type {product_type_id}")))?;
        if ProductKind::from(product.kind) != ProductKind::Loan || !product.is_active {
            return Err(DbError::validation("product", "not an active loan product"));
        }

        let projection = compute_projection(
            &product,
            requested_amount,
            calculation_mode,
            term_months,
            monthly_payment,
            start_date,
            repayment_frequency,
        )?;

        let mut active: loan_applications::ActiveModel = application.into();
        active.requested_amount = Set(requested_amount);
        active.calculation_mode = Set(calculation_mode.into());
        active.term_months = Set(i32::try_from(projection.term_months).unwrap_or(i32::MAX));
        active.monthly_payment = Set(projection.monthly_payment);
        active.total_interest = Set(projection.total_interest);
        active.repayment_amount = Set(projection.total_repayment);
        active.product_type_id = Set(product.id);
        active.start_date = Set(start_date);
        active.repayment_frequency = Set(repayment_frequency.into());
        active.projection =
            Set(serde_json::to_value(&projection).map_err(|e| DbError::Integrity(e.to_string()))?);
        active.status = Set(next.into());
        active.updated_at = Set(now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Member accepts the amendment. The self-guarantee is auto-maximised
    /// to `min(available savings, requested amount)`.
    #[instrument(skip(self))]
    pub async fn accept_amendment(
        &self,
        application_id: Uuid,
        acting_member: Uuid,
    ) -> DbResult<loan_applications::Model> {
        let txn = self.db.begin().await?;
        let application = lock_application(&txn, application_id).await?;
        require_owner(&application, acting_member)?;

        let coverage = compute_coverage(&txn, &application).await?;
        let self_amount = coverage.auto_self_guarantee(application.requested_amount);
        let guaranteed_by_others =
            coverage.effective_coverage - application.self_guaranteed_amount;
        let fully_covered =
            self_amount + guaranteed_by_others >= application.requested_amount;

        let next = LoanWorkflow::accept_amendment(application.status.into(), fully_covered)?;

        let mut active: loan_applications::ActiveModel = application.into();
        active.self_guaranteed_amount = Set(self_amount);
        active.status = Set(next.into());
        active.updated_at = Set(now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Member cancels an amended application.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        application_id: Uuid,
        acting_member: Uuid,
    ) -> DbResult<loan_applications::Model> {
        let txn = self.db.begin().await?;
        let application = lock_application(&txn, application_id).await?;
        require_owner(&application, acting_member)?;

        let next = LoanWorkflow::cancel(application.status.into())?;
        let updated = set_status(&txn, application, next).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Coverage breakdown of an application.
    pub async fn coverage(&self, application_id: Uuid) -> DbResult<Coverage> {
        let application = self.get(application_id).await?;
        compute_coverage(&self.db, &application).await
    }

    /// Member submits a fully covered application.
    ///
    /// Commits every accepted guarantee, and the self-guarantee surrogate,
    /// against its guarantor profile. Profiles are locked in id order;
    /// any capacity failure rolls the whole submission back.
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        application_id: Uuid,
        acting_member: Uuid,
    ) -> DbResult<loan_applications::Model> {
        let txn = self.db.begin().await?;
        let application = lock_application(&txn, application_id).await?;
        require_owner(&application, acting_member)?;

        let next = LoanWorkflow::submit(application.status.into())?;

        let coverage = compute_coverage(&txn, &application).await?;
        if !coverage.is_fully_covered {
            return Err(WorkflowError::NotFullyCovered {
                remaining: coverage.remaining_to_cover,
            }
            .into());
        }

        // Gather the parties to commit: external accepted guarantees plus
        // the self-guarantee surrogate.
        let mut parties: Vec<(Uuid, Decimal, Uuid)> = Vec::new();

        let external = guarantee_requests::Entity::find()
            .filter(guarantee_requests::Column::LoanApplicationId.eq(application.id))
            .filter(guarantee_requests::Column::Status.eq(orm::GuaranteeStatus::Accepted))
            .filter(guarantee_requests::Column::IsSelf.eq(false))
            .all(&txn)
            .await?;
        for request in &external {
            parties.push((
                request.guarantor_profile_id,
                request.guaranteed_amount,
                request.id,
            ));
        }

        if application.self_guaranteed_amount > Decimal::ZERO {
            let surrogate =
                ensure_self_surrogate(&txn, &application).await?;
            parties.push((
                surrogate.guarantor_profile_id,
                application.self_guaranteed_amount,
                surrogate.id,
            ));
        }

        // Deterministic lock order prevents deadlock between concurrent
        // submissions sharing guarantors.
        parties.sort_by_key(|(profile_id, _, _)| *profile_id);

        for (profile_id, amount, request_id) in parties {
            let profile = GuarantorRepository::lock(&txn, profile_id).await?;
            GuarantorRepository::commit_capacity(&txn, profile, amount).await?;

            let request = guarantee_requests::Entity::find_by_id(request_id)
                .one(&txn)
                .await?
                .ok_or_else(|| DbError::NotFound("guarantee request".to_string()))?;
            let mut active: guarantee_requests::ActiveModel = request.into();
            active.outstanding_amount = Set(amount);
            active.updated_at = Set(now());
            active.update(&txn).await?;
        }

        let updated = set_status(&txn, application, next).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Administrator approves a submitted application, linking the
    /// member's active loan account. No ledger impact yet.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        application_id: Uuid,
        acting_admin: Uuid,
    ) -> DbResult<loan_applications::Model> {
        let txn = self.db.begin().await?;
        require_admin(&txn, acting_admin).await?;

        let application = lock_application(&txn, application_id).await?;
        let next = LoanWorkflow::approve(application.status.into())?;

        let loan_account = accounts::Entity::find()
            .filter(accounts::Column::MemberId.eq(application.member_id))
            .filter(accounts::Column::ProductTypeId.eq(application.product_type_id))
            .filter(accounts::Column::Kind.eq(orm::ProductKind::Loan))
            .filter(accounts::Column::IsActive.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                DbError::NotFound("no active loan account for member and product".to_string())
            })?;

        let mut active: loan_applications::ActiveModel = application.into();
        active.loan_account_id = Set(Some(loan_account.id));
        active.status = Set(next.into());
        active.updated_at = Set(now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        self.notify_decision(&updated, "approved").await;
        Ok(updated)
    }

    /// Administrator declines a submitted application. Every commitment
    /// is reverted and external requests are cancelled.
    #[instrument(skip(self))]
    pub async fn decline(
        &self,
        application_id: Uuid,
        acting_admin: Uuid,
    ) -> DbResult<loan_applications::Model> {
        let txn = self.db.begin().await?;
        require_admin(&txn, acting_admin).await?;

        let application = lock_application(&txn, application_id).await?;
        let next = LoanWorkflow::decline(application.status.into())?;

        let mut committed = guarantee_requests::Entity::find()
            .filter(guarantee_requests::Column::LoanApplicationId.eq(application.id))
            .filter(guarantee_requests::Column::Status.eq(orm::GuaranteeStatus::Accepted))
            .all(&txn)
            .await?;
        committed.sort_by_key(|g| g.guarantor_profile_id);

        for request in committed {
            let profile = GuarantorRepository::lock(&txn, request.guarantor_profile_id).await?;
            GuarantorRepository::release_capacity(&txn, profile, request.outstanding_amount)
                .await?;

            let mut active: guarantee_requests::ActiveModel = request.into();
            active.status = Set(orm::GuaranteeStatus::Cancelled);
            active.outstanding_amount = Set(Decimal::ZERO);
            active.updated_at = Set(now());
            active.update(&txn).await?;
        }

        let mut active: loan_applications::ActiveModel = application.into();
        active.self_guaranteed_amount = Set(Decimal::ZERO);
        active.status = Set(next.into());
        active.updated_at = Set(now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        self.notify_decision(&updated, "declined").await;
        Ok(updated)
    }

    /// Administrator disburses an approved application: the outstanding
    /// balance grows by the requested amount and a `loan_disbursement`
    /// journal posts, atomically with the status change.
    #[instrument(skip(self))]
    pub async fn disburse(
        &self,
        application_id: Uuid,
        acting_admin: Uuid,
        payment_method: PaymentMethod,
        disbursement_date: NaiveDate,
    ) -> DbResult<loan_applications::Model> {
        let txn = self.db.begin().await?;
        require_admin(&txn, acting_admin).await?;

        let application = lock_application(&txn, application_id).await?;
        let next = LoanWorkflow::disburse(application.status.into())?;
        let loan_account_id = application.loan_account_id.ok_or_else(|| {
            DbError::State("application has no linked loan account".to_string())
        })?;

        TransactionEngine::disburse_loan(
            &txn,
            RecordTransaction {
                account_id: loan_account_id,
                amount: application.requested_amount,
                payment_method,
                currency: Currency::default(),
                transaction_date: disbursement_date,
                receipt_number: None,
                description: Some(format!("Loan disbursement {}", application.reference)),
                recorded_by: acting_admin,
            },
        )
        .await?;

        let updated = set_status(&txn, application, next).await?;
        txn.commit().await?;
        self.notify_decision(&updated, "disbursed").await;
        Ok(updated)
    }

    async fn notify_decision(&self, application: &loan_applications::Model, decision: &str) {
        let Some(mailer) = &self.mailer else { return };

        let member = members::Entity::find_by_id(application.member_id)
            .one(&self.db)
            .await
            .ok()
            .flatten();
        if let Some(member) = member {
            let result = mailer
                .send_loan_decision(
                    &member.email,
                    &member.first_name,
                    decision,
                    &application.requested_amount.to_string(),
                )
                .await;
            if let Err(err) = result {
                warn!(error = %err, decision, "loan decision mail failed");
            }
        }
    }
}

async fn lock_application(
    txn: &DatabaseTransaction,
    application_id: Uuid,
) -> DbResult<loan_applications::Model> {
    loan_applications::Entity::find_by_id(application_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("loan application {application_id}")))
}

fn require_owner(application: &loan_applications::Model, acting_member: Uuid) -> DbResult<()> {
    if application.member_id == acting_member {
        Ok(())
    } else {
        Err(DbError::Forbidden(
            "only the applicant can act on this application".to_string(),
        ))
    }
}

async fn require_admin(txn: &DatabaseTransaction, acting_member: Uuid) -> DbResult<()> {
    let member = members::Entity::find_by_id(acting_member)
        .one(txn)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("member {acting_member}")))?;
    if member.is_system_admin || member.is_superuser {
        Ok(())
    } else {
        Err(DbError::Forbidden(
            "administrator role required".to_string(),
        ))
    }
}

async fn set_status(
    txn: &DatabaseTransaction,
    application: loan_applications::Model,
    next: ApplicationStatus,
) -> DbResult<loan_applications::Model> {
    let mut active: loan_applications::ActiveModel = application.into();
    active.status = Set(next.into());
    active.updated_at = Set(now());
    Ok(active.update(txn).await?)
}

/// Ensures the applicant's self-guarantee surrogate request exists with
/// the current amount and `accepted` status.
async fn ensure_self_surrogate(
    txn: &DatabaseTransaction,
    application: &loan_applications::Model,
) -> DbResult<guarantee_requests::Model> {
    let profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(application.member_id))
        .one(txn)
        .await?
        .ok_or_else(|| DbError::NotFound("applicant guarantor profile".to_string()))?;

    let existing = guarantee_requests::Entity::find()
        .filter(guarantee_requests::Column::LoanApplicationId.eq(application.id))
        .filter(guarantee_requests::Column::GuarantorProfileId.eq(profile.id))
        .one(txn)
        .await?;

    let timestamp = now();
    match existing {
        Some(surrogate) => {
            let mut active: guarantee_requests::ActiveModel = surrogate.into();
            active.guaranteed_amount = Set(application.self_guaranteed_amount);
            active.status = Set(orm::GuaranteeStatus::Accepted);
            active.is_self = Set(true);
            active.updated_at = Set(timestamp);
            Ok(active.update(txn).await?)
        }
        None => Ok(guarantee_requests::ActiveModel {
            id: Set(Uuid::now_v7()),
            loan_application_id: Set(application.id),
            guarantor_profile_id: Set(profile.id),
            guaranteed_amount: Set(application.self_guaranteed_amount),
            outstanding_amount: Set(Decimal::ZERO),
            status: Set(orm::GuaranteeStatus::Accepted),
            note: Set(None),
            is_self: Set(true),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(txn)
        .await?),
    }
}

/// Computes the projection snapshot for the supplied inputs.
fn compute_projection(
    product: &product_types::Model,
    requested_amount: Decimal,
    mode: CalculationMode,
    term_months: Option<u32>,
    monthly_payment: Option<Decimal>,
    start_date: NaiveDate,
    frequency: RepaymentFrequency,
) -> DbResult<Projection> {
    let annual_rate = product
        .interest_rate
        .ok_or_else(|| DbError::validation("product", "loan product has no interest rate"))?;

    let projection = match mode {
        CalculationMode::FixedTerm => {
            let term = term_months
                .ok_or_else(|| DbError::validation("term_months", "required in fixed-term mode"))?;
            fixed_term(requested_amount, annual_rate, term, start_date, frequency)?
        }
        CalculationMode::FixedPayment => {
            let payment = monthly_payment.ok_or_else(|| {
                DbError::validation("monthly_payment", "required in fixed-payment mode")
            })?;
            fixed_payment(requested_amount, annual_rate, payment, start_date, frequency)?
        }
    };
    Ok(projection)
}

/// Computes the coverage breakdown of an application.
///
/// `committed_self_other` counts the applicant's accepted guarantees on
/// OTHER live applications, so savings pledged elsewhere cannot be
/// pledged twice.
pub(crate) async fn compute_coverage<C: ConnectionTrait>(
    conn: &C,
    application: &loan_applications::Model,
) -> DbResult<Coverage> {
    let savings = accounts::Entity::find()
        .filter(accounts::Column::MemberId.eq(application.member_id))
        .filter(accounts::Column::Kind.eq(orm::ProductKind::Savings))
        .all(conn)
        .await?;
    let total_savings: Decimal = savings.iter().map(|a| a.balance).sum();

    let own_profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(application.member_id))
        .one(conn)
        .await?;

    let committed_self_other = match &own_profile {
        Some(profile) => {
            let elsewhere = guarantee_requests::Entity::find()
                .filter(guarantee_requests::Column::GuarantorProfileId.eq(profile.id))
                .filter(guarantee_requests::Column::Status.eq(orm::GuaranteeStatus::Accepted))
                .filter(guarantee_requests::Column::LoanApplicationId.ne(application.id))
                .join(
                    JoinType::InnerJoin,
                    guarantee_requests::Relation::LoanApplications.def(),
                )
                .filter(loan_applications::Column::Status.is_in(COMMITTED_STATES))
                .all(conn)
                .await?;
            elsewhere.iter().map(|g| g.guaranteed_amount).sum()
        }
        None => Decimal::ZERO,
    };

    let external = guarantee_requests::Entity::find()
        .filter(guarantee_requests::Column::LoanApplicationId.eq(application.id))
        .filter(guarantee_requests::Column::Status.eq(orm::GuaranteeStatus::Accepted))
        .filter(guarantee_requests::Column::IsSelf.eq(false))
        .all(conn)
        .await?;
    let guaranteed_by_others: Decimal = external.iter().map(|g| g.guaranteed_amount).sum();

    Ok(Coverage::compute(CoverageInputs {
        requested_amount: application.requested_amount,
        total_savings,
        committed_self_other,
        self_guaranteed_amount: application.self_guaranteed_amount,
        guaranteed_by_others,
    }))
}
