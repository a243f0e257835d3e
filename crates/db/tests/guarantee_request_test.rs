//! Integration tests for external guarantees: request, acceptance with
//! capacity checks, coverage-driven status moves, and commitment at
//! submission across multiple guarantors.

mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use tamarind_core::catalog::ProductKind;
use tamarind_core::loan::{CalculationMode, RepaymentFrequency};
use tamarind_db::entities::{guarantor_profiles, sea_orm_active_enums as orm};
use tamarind_db::repositories::guarantee_request::NewGuaranteeRequest;
use tamarind_db::repositories::loan_application::NewLoanApplication;
use tamarind_db::{
    DbError, GuaranteeRequestRepository, GuarantorRepository, LoanApplicationRepository,
};

#[tokio::test]
async fn external_guarantee_completes_coverage() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    let savings_type =
        common::create_product_type(&db, ProductKind::Savings, None, None, None).await;
    let loan_type =
        common::create_product_type(&db, ProductKind::Loan, Some(dec!(12)), None, None).await;

    // Applicant holds 40 000 in savings, guarantor 100 000.
    let applicant = common::create_member(&db, false).await;
    let applicant_savings = common::account_for(&db, applicant.id, savings_type.id).await;
    common::deposit_savings(&db, applicant_savings.id, dec!(40000.00), admin.id).await;

    let guarantor = common::create_member(&db, false).await;
    let guarantor_savings = common::account_for(&db, guarantor.id, savings_type.id).await;
    common::deposit_savings(&db, guarantor_savings.id, dec!(100000.00), admin.id).await;

    let applications = LoanApplicationRepository::new(db.clone());
    let application = applications
        .create(
            NewLoanApplication {
                member_id: applicant.id,
                product_type_id: loan_type.id,
                requested_amount: dec!(60000.00),
                calculation_mode: CalculationMode::FixedTerm,
                term_months: Some(24),
                monthly_payment: None,
                repayment_frequency: RepaymentFrequency::Monthly,
                start_date: Utc::now().date_naive(),
            },
            applicant.id,
        )
        .await
        .unwrap();

    let application = applications
        .submit_for_amendment(application.id, applicant.id)
        .await
        .unwrap();
    let application = applications
        .amend(application.id, admin.id, Default::default())
        .await
        .unwrap();

    // Savings cover 40 000 of 60 000: acceptance leaves it in progress.
    let application = applications
        .accept_amendment(application.id, applicant.id)
        .await
        .unwrap();
    assert_eq!(application.self_guaranteed_amount, dec!(40000.00));
    assert_eq!(application.status, orm::ApplicationStatus::InProgress);

    // The guarantor covers the remaining 20 000.
    let requests = GuaranteeRequestRepository::new(db.clone());
    let request = requests
        .create(
            NewGuaranteeRequest {
                loan_application_id: application.id,
                guarantor_member_id: guarantor.id,
                note: Some("covering the balance".to_string()),
            },
            applicant.id,
        )
        .await
        .unwrap();
    assert_eq!(request.status, orm::GuaranteeStatus::Pending);

    let request = requests
        .accept(request.id, guarantor.id, dec!(20000.00), None)
        .await
        .unwrap();
    assert_eq!(request.status, orm::GuaranteeStatus::Accepted);

    // Full coverage promoted the application.
    let application = applications.get(application.id).await.unwrap();
    assert_eq!(application.status, orm::ApplicationStatus::ReadyForSubmission);

    // Submission commits both profiles.
    applications.submit(application.id, applicant.id).await.unwrap();

    let applicant_profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(applicant.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(applicant_profile.committed_guarantee_amount, dec!(40000.00));

    let guarantor_profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(guarantor.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(guarantor_profile.committed_guarantee_amount, dec!(20000.00));

    // The accepted guarantee is now a live one for the guarantor.
    let guarantors = GuarantorRepository::new(db.clone());
    assert_eq!(
        guarantors
            .active_guarantees_count(guarantor_profile.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn acceptance_beyond_capacity_is_rejected() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    let savings_type =
        common::create_product_type(&db, ProductKind::Savings, None, None, None).await;
    let loan_type =
        common::create_product_type(&db, ProductKind::Loan, Some(dec!(12)), None, None).await;

    let applicant = common::create_member(&db, false).await;
    let applicant_savings = common::account_for(&db, applicant.id, savings_type.id).await;
    common::deposit_savings(&db, applicant_savings.id, dec!(1000.00), admin.id).await;

    // The guarantor has only 5 000 of savings-backed capacity.
    let guarantor = common::create_member(&db, false).await;
    let guarantor_savings = common::account_for(&db, guarantor.id, savings_type.id).await;
    common::deposit_savings(&db, guarantor_savings.id, dec!(5000.00), admin.id).await;

    let applications = LoanApplicationRepository::new(db.clone());
    let application = applications
        .create(
            NewLoanApplication {
                member_id: applicant.id,
                product_type_id: loan_type.id,
                requested_amount: dec!(50000.00),
                calculation_mode: CalculationMode::FixedTerm,
                term_months: Some(12),
                monthly_payment: None,
                repayment_frequency: RepaymentFrequency::Monthly,
                start_date: Utc::now().date_naive(),
            },
            applicant.id,
        )
        .await
        .unwrap();

    let requests = GuaranteeRequestRepository::new(db.clone());
    let request = requests
        .create(
            NewGuaranteeRequest {
                loan_application_id: application.id,
                guarantor_member_id: guarantor.id,
                note: None,
            },
            applicant.id,
        )
        .await
        .unwrap();

    let err = requests
        .accept(request.id, guarantor.id, dec!(10000.00), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Validation { .. }));
}

#[tokio::test]
async fn duplicate_guarantee_request_is_rejected() {
    let Some(db) = common::test_db().await else { return };

    let _savings =
        common::create_product_type(&db, ProductKind::Savings, None, None, None).await;
    let loan_type =
        common::create_product_type(&db, ProductKind::Loan, Some(dec!(12)), None, None).await;

    let applicant = common::create_member(&db, false).await;
    let guarantor = common::create_member(&db, false).await;

    let applications = LoanApplicationRepository::new(db.clone());
    let application = applications
        .create(
            NewLoanApplication {
                member_id: applicant.id,
                product_type_id: loan_type.id,
                requested_amount: dec!(10000.00),
                calculation_mode: CalculationMode::FixedTerm,
                term_months: Some(6),
                monthly_payment: None,
                repayment_frequency: RepaymentFrequency::Monthly,
                start_date: Utc::now().date_naive(),
            },
            applicant.id,
        )
        .await
        .unwrap();

    let requests = GuaranteeRequestRepository::new(db.clone());
    let input = NewGuaranteeRequest {
        loan_application_id: application.id,
        guarantor_member_id: guarantor.id,
        note: None,
    };
    requests.create(input.clone(), applicant.id).await.unwrap();

    let err = requests.create(input, applicant.id).await.unwrap_err();
    assert!(matches!(err, DbError::Conflict(_)));
}
