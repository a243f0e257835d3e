//! Integration tests for fee payments with dynamic crediting and the
//! member fee record.

mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use tamarind_core::catalog::{FeeClassification, ProductKind};
use tamarind_db::entities::{journal_entries, member_fees};
use tamarind_db::{JournalRepository, TransactionEngine};

#[tokio::test]
async fn fee_payment_credits_by_classification() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    // A liability-classified fee credits member contributions (2030).
    let fee_type = common::create_product_type(
        &db,
        ProductKind::Fee,
        None,
        Some(dec!(2000.00)),
        Some(FeeClassification::Liability),
    )
    .await;
    let member = common::create_member(&db, false).await;
    let account = common::account_for(&db, member.id, fee_type.id).await;

    let engine = TransactionEngine::new(db.clone());
    let payment = engine
        .record_fee_payment(common::record(account.id, dec!(1200.00), admin.id))
        .await
        .unwrap();

    let journal = JournalRepository::new(db.clone())
        .find_by_source("transaction", payment.id)
        .await
        .unwrap()
        .expect("no journal posted");
    let entries = journal_entries::Entity::find()
        .filter(journal_entries::Column::JournalId.eq(journal.id))
        .all(&db)
        .await
        .unwrap();

    let cash = common::gl_account_id(&db, "1010").await;
    let contributions = common::gl_account_id(&db, "2030").await;
    assert!(
        entries
            .iter()
            .any(|e| e.gl_account_id == cash && e.debit == dec!(1200.00))
    );
    assert!(
        entries
            .iter()
            .any(|e| e.gl_account_id == contributions && e.credit == dec!(1200.00))
    );

    // Below the standard amount: not yet paid up.
    let fee = member_fees::Entity::find()
        .filter(member_fees::Column::MemberId.eq(member.id))
        .filter(member_fees::Column::ProductTypeId.eq(fee_type.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fee.amount_paid, dec!(1200.00));
    assert!(!fee.is_paid);

    // A second payment covers the standard amount.
    engine
        .record_fee_payment(common::record(account.id, dec!(800.00), admin.id))
        .await
        .unwrap();
    let fee = member_fees::Entity::find_by_id(fee.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fee.amount_paid, dec!(2000.00));
    assert!(fee.is_paid);
}

#[tokio::test]
async fn fee_payment_is_idempotent_in_the_ledger() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    let fee_type = common::create_product_type(
        &db,
        ProductKind::Fee,
        None,
        Some(dec!(500.00)),
        None,
    )
    .await;
    let member = common::create_member(&db, false).await;
    let account = common::account_for(&db, member.id, fee_type.id).await;

    let engine = TransactionEngine::new(db.clone());
    let payment = engine
        .record_fee_payment(common::record(account.id, dec!(500.00), admin.id))
        .await
        .unwrap();

    // Exactly one journal per source transaction.
    let journals = JournalRepository::new(db.clone());
    let first = journals
        .find_by_source("transaction", payment.id)
        .await
        .unwrap();
    assert!(first.is_some());
    let entries = journals.entries(first.unwrap().id).await.unwrap();
    assert_eq!(entries.len(), 2);
}
