//! Integration tests for the loan application lifecycle: the full
//! happy path, decline reversal, proportional release, and double-submit
//! rejection.

mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use tamarind_core::catalog::ProductKind;
use tamarind_core::loan::{CalculationMode, RepaymentFrequency};
use tamarind_core::transaction::{PaymentMethod, RepaymentType};
use tamarind_db::entities::{guarantor_profiles, journal_entries, sea_orm_active_enums as orm};
use tamarind_db::repositories::loan_application::NewLoanApplication;
use tamarind_db::{
    AccountRepository, DbError, JournalRepository, LoanApplicationRepository, TransactionEngine,
};

struct Lifecycle {
    admin: tamarind_db::entities::members::Model,
    member: tamarind_db::entities::members::Model,
    loan_account: tamarind_db::entities::accounts::Model,
    application: tamarind_db::entities::loan_applications::Model,
}

/// Drives M1 (savings 60 000) through create → amend → accept → submit
/// against a 10% loan product for 60 000 over 12 months.
async fn submit_application(db: &sea_orm::DatabaseConnection) -> Lifecycle {
    let admin = common::create_member(db, true).await;
    let savings_type =
        common::create_product_type(db, ProductKind::Savings, None, None, None).await;
    let loan_type =
        common::create_product_type(db, ProductKind::Loan, Some(dec!(10)), None, None).await;

    let member = common::create_member(db, false).await;
    let savings_account = common::account_for(db, member.id, savings_type.id).await;
    common::deposit_savings(db, savings_account.id, dec!(60000.00), admin.id).await;

    let repo = LoanApplicationRepository::new(db.clone());
    let application = repo
        .create(
            NewLoanApplication {
                member_id: member.id,
                product_type_id: loan_type.id,
                requested_amount: dec!(60000.00),
                calculation_mode: CalculationMode::FixedTerm,
                term_months: Some(12),
                monthly_payment: None,
                repayment_frequency: RepaymentFrequency::Monthly,
                start_date: Utc::now().date_naive(),
            },
            member.id,
        )
        .await
        .expect("application creation failed");

    // Annuity payment on 60 000 at 10%/yr over 12 months.
    assert_eq!(application.term_months, 12);
    assert!(
        (application.monthly_payment - dec!(5274.95)).abs() <= dec!(0.01),
        "unexpected payment {}",
        application.monthly_payment
    );
    assert_eq!(
        application.repayment_amount,
        dec!(60000.00) + application.total_interest
    );

    let application = repo
        .submit_for_amendment(application.id, member.id)
        .await
        .unwrap();
    let application = repo
        .amend(application.id, admin.id, Default::default())
        .await
        .unwrap();

    // Acceptance auto-maximises the self-guarantee and, fully covered,
    // lands in ready_for_submission.
    let application = repo.accept_amendment(application.id, member.id).await.unwrap();
    assert_eq!(application.self_guaranteed_amount, dec!(60000.00));
    assert_eq!(application.status, orm::ApplicationStatus::ReadyForSubmission);

    let application = repo.submit(application.id, member.id).await.unwrap();
    assert_eq!(application.status, orm::ApplicationStatus::Submitted);

    // Submission committed the member's own capacity.
    let profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(member.id))
        .one(db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.committed_guarantee_amount, dec!(60000.00));

    let loan_account = common::account_for(db, member.id, loan_type.id).await;

    Lifecycle {
        admin,
        member,
        loan_account,
        application,
    }
}

async fn journal_codes(db: &sea_orm::DatabaseConnection, reference_id: Uuid) -> Vec<(String, rust_decimal::Decimal, rust_decimal::Decimal)> {
    let journal = JournalRepository::new(db.clone())
        .find_by_source("transaction", reference_id)
        .await
        .unwrap()
        .expect("no journal posted");
    let entries = journal_entries::Entity::find()
        .filter(journal_entries::Column::JournalId.eq(journal.id))
        .all(db)
        .await
        .unwrap();

    let mut codes = Vec::new();
    for entry in entries {
        let account = tamarind_db::entities::gl_accounts::Entity::find_by_id(entry.gl_account_id)
            .one(db)
            .await
            .unwrap()
            .unwrap();
        codes.push((account.code, entry.debit, entry.credit));
    }
    codes.sort();
    codes
}

#[tokio::test]
async fn loan_lifecycle_happy_path() {
    let Some(db) = common::test_db().await else { return };
    let flow = submit_application(&db).await;

    let repo = LoanApplicationRepository::new(db.clone());
    let application = repo.approve(flow.application.id, flow.admin.id).await.unwrap();
    assert_eq!(application.status, orm::ApplicationStatus::Approved);
    assert_eq!(application.loan_account_id, Some(flow.loan_account.id));

    let application = repo
        .disburse(
            application.id,
            flow.admin.id,
            PaymentMethod::BankTransfer,
            Utc::now().date_naive(),
        )
        .await
        .unwrap();
    assert_eq!(application.status, orm::ApplicationStatus::Disbursed);

    // Outstanding balance equals the requested amount.
    let accounts = AccountRepository::new(db.clone());
    assert_eq!(
        accounts.balance(flow.loan_account.id).await.unwrap(),
        dec!(60000.00)
    );

    // Journal: 1020 debited, 1010 credited.
    let disbursement = tamarind_db::entities::transactions::Entity::find()
        .filter(
            tamarind_db::entities::transactions::Column::AccountId.eq(flow.loan_account.id),
        )
        .filter(
            tamarind_db::entities::transactions::Column::Kind
                .eq(orm::TransactionKind::LoanDisbursement),
        )
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let codes = journal_codes(&db, disbursement.id).await;
    assert_eq!(
        codes,
        vec![
            ("1010".to_string(), dec!(0.00), dec!(60000.00)),
            ("1020".to_string(), dec!(60000.00), dec!(0.00)),
        ]
    );
}

#[tokio::test]
async fn decline_reverts_commitments() {
    let Some(db) = common::test_db().await else { return };
    let flow = submit_application(&db).await;

    let repo = LoanApplicationRepository::new(db.clone());
    let application = repo.decline(flow.application.id, flow.admin.id).await.unwrap();
    assert_eq!(application.status, orm::ApplicationStatus::Declined);
    assert_eq!(application.self_guaranteed_amount, dec!(0.00));

    let profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(flow.member.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.committed_guarantee_amount, dec!(0.00));

    // No ledger impact from a decline.
    let journal = JournalRepository::new(db.clone())
        .find_by_source("loan_application", application.id)
        .await
        .unwrap();
    assert!(journal.is_none());
}

#[tokio::test]
async fn repayment_releases_guarantees_proportionally() {
    let Some(db) = common::test_db().await else { return };
    let flow = submit_application(&db).await;

    let repo = LoanApplicationRepository::new(db.clone());
    repo.approve(flow.application.id, flow.admin.id).await.unwrap();
    repo.disburse(
        flow.application.id,
        flow.admin.id,
        PaymentMethod::BankTransfer,
        Utc::now().date_naive(),
    )
    .await
    .unwrap();

    // Repay 10% of the principal.
    let engine = TransactionEngine::new(db.clone());
    let repayment = engine
        .record_loan_repayment(
            common::record(flow.loan_account.id, dec!(6000.00), flow.admin.id),
            RepaymentType::Principal,
        )
        .await
        .unwrap();

    let accounts = AccountRepository::new(db.clone());
    assert_eq!(
        accounts.balance(flow.loan_account.id).await.unwrap(),
        dec!(54000.00)
    );

    // 10% of the committed guarantee released.
    let profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(flow.member.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.committed_guarantee_amount, dec!(54000.00));

    // Journal: 1010 debited, 1020 credited.
    let codes = journal_codes(&db, repayment.id).await;
    assert_eq!(
        codes,
        vec![
            ("1010".to_string(), dec!(6000.00), dec!(0.00)),
            ("1020".to_string(), dec!(0.00), dec!(6000.00)),
        ]
    );
}

#[tokio::test]
async fn double_submit_is_rejected() {
    let Some(db) = common::test_db().await else { return };
    let flow = submit_application(&db).await;

    let repo = LoanApplicationRepository::new(db.clone());
    let err = repo
        .submit(flow.application.id, flow.member.id)
        .await
        .unwrap_err();
    match err {
        DbError::State(message) => assert!(message.contains("Already submitted")),
        other => panic!("expected a state error, got {other:?}"),
    }

    // Commitment unchanged by the failed second submit.
    let profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(flow.member.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.committed_guarantee_amount, dec!(60000.00));
}
