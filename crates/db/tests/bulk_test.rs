//! Integration tests for bulk batch processing: per-row savepoints and
//! success/failure accounting.

mod common;

use chrono::Utc;
use rust_decimal_macros::dec;

use tamarind_core::bulk::BatchOutcome;
use tamarind_core::catalog::ProductKind;
use tamarind_core::transaction::{PaymentMethod, TransactionKind};
use tamarind_db::repositories::bulk::{BulkBatch, BulkRow};
use tamarind_db::{AccountRepository, BulkRepository};

#[tokio::test]
async fn bulk_batch_continues_past_bad_rows() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    let savings_type =
        common::create_product_type(&db, ProductKind::Savings, None, None, None).await;
    let member_a = common::create_member(&db, false).await;
    let member_b = common::create_member(&db, false).await;
    let account_a = common::account_for(&db, member_a.id, savings_type.id).await;
    let account_b = common::account_for(&db, member_b.id, savings_type.id).await;

    let batch = BulkBatch {
        kind: TransactionKind::SavingsDeposit,
        rows: vec![
            BulkRow {
                account_number: account_a.account_number.clone(),
                amount: dec!(300.00),
                payment_method: PaymentMethod::Cash,
            },
            BulkRow {
                account_number: "WM2600000000DOES_NOT_EXIST".to_string(),
                amount: dec!(100.00),
                payment_method: PaymentMethod::Cash,
            },
            BulkRow {
                account_number: account_b.account_number.clone(),
                amount: dec!(200.00),
                payment_method: PaymentMethod::MobileMoney,
            },
        ],
        file_name: Some("deposits.csv".to_string()),
        csv: None,
        batch_date: Utc::now().date_naive(),
        recorded_by: admin.id,
    };

    let result = BulkRepository::new(db.clone()).process(batch).await.unwrap();

    assert_eq!(result.summary.success_count, 2);
    assert_eq!(result.summary.error_count, 1);
    assert_eq!(result.summary.failures[0].index, 1);
    assert_eq!(result.outcome, BatchOutcome::Created);
    assert_eq!(result.log.success_count, 2);
    assert_eq!(result.log.error_count, 1);
    assert!(result.log.reference_prefix.contains("SAVINGS_DEPOSIT-BULK-"));

    // Good rows settled despite the bad one.
    let accounts = AccountRepository::new(db.clone());
    assert_eq!(accounts.balance(account_a.id).await.unwrap(), dec!(300.00));
    assert_eq!(accounts.balance(account_b.id).await.unwrap(), dec!(200.00));
}

#[tokio::test]
async fn bulk_batch_with_all_failures_reports_all_failed() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;

    let batch = BulkBatch {
        kind: TransactionKind::SavingsDeposit,
        rows: vec![BulkRow {
            account_number: "WM26MISSING01".to_string(),
            amount: dec!(100.00),
            payment_method: PaymentMethod::Cash,
        }],
        file_name: None,
        csv: None,
        batch_date: Utc::now().date_naive(),
        recorded_by: admin.id,
    };

    let result = BulkRepository::new(db.clone()).process(batch).await.unwrap();
    assert_eq!(result.summary.success_count, 0);
    assert_eq!(result.summary.error_count, 1);
    assert_eq!(result.outcome, BatchOutcome::AllFailed);
}
