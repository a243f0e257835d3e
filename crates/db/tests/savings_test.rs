//! Integration tests for savings flows: balanced deposit postings,
//! withdrawal settlement, guarantee ceiling recomputation, and posting
//! idempotency.

mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use tamarind_core::catalog::ProductKind;
use tamarind_db::entities::{guarantor_profiles, journal_entries, journals};
use tamarind_db::{AccountRepository, JournalRepository, ReportRepository, TransactionEngine};

#[tokio::test]
async fn savings_deposit_posts_balanced_journal() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    let savings_type =
        common::create_product_type(&db, ProductKind::Savings, None, None, None).await;
    let member = common::create_member(&db, false).await;
    let account = common::account_for(&db, member.id, savings_type.id).await;
    assert_eq!(account.balance, dec!(0));

    let engine = TransactionEngine::new(db.clone());
    let deposit = engine
        .record_savings_deposit(common::record(account.id, dec!(500.00), admin.id))
        .await
        .expect("deposit failed");

    // Balance mutated.
    let accounts = AccountRepository::new(db.clone());
    assert_eq!(accounts.balance(account.id).await.unwrap(), dec!(500.00));

    // One journal with (1010 debit 500) and (2010 credit 500).
    let journal = JournalRepository::new(db.clone())
        .find_by_source("transaction", deposit.id)
        .await
        .unwrap()
        .expect("no journal posted");
    let entries = journal_entries::Entity::find()
        .filter(journal_entries::Column::JournalId.eq(journal.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    let cash = common::gl_account_id(&db, "1010").await;
    let savings_liability = common::gl_account_id(&db, "2010").await;
    let debit_entry = entries.iter().find(|e| e.gl_account_id == cash).unwrap();
    assert_eq!(debit_entry.debit, dec!(500.00));
    assert_eq!(debit_entry.credit, dec!(0.00));
    let credit_entry = entries
        .iter()
        .find(|e| e.gl_account_id == savings_liability)
        .unwrap();
    assert_eq!(credit_entry.credit, dec!(500.00));

    // Trial balance stays balanced.
    let trial = ReportRepository::new(db.clone())
        .trial_balance(Utc::now().date_naive())
        .await
        .unwrap();
    assert!(trial.is_balanced);

    // Identity carries the SD prefix and the civil date.
    let expected_prefix = format!("SD{}", Utc::now().date_naive().format("%Y%m%d"));
    assert!(deposit.identity.starts_with(&expected_prefix));
}

#[tokio::test]
async fn deposit_then_withdrawal_round_trips() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    let savings_type =
        common::create_product_type(&db, ProductKind::Savings, None, None, None).await;
    let member = common::create_member(&db, false).await;
    let account = common::account_for(&db, member.id, savings_type.id).await;

    let engine = TransactionEngine::new(db.clone());
    engine
        .record_savings_deposit(common::record(account.id, dec!(750.00), admin.id))
        .await
        .unwrap();

    // Ceiling follows the savings balance.
    let profile = guarantor_profiles::Entity::find()
        .filter(guarantor_profiles::Column::MemberId.eq(member.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.max_guarantee_amount, dec!(750.00));

    // Withdrawal requests settle on approval.
    let request = engine
        .request_savings_withdrawal(common::record(account.id, dec!(750.00), member.id))
        .await
        .unwrap();
    let settled = engine.settle_withdrawal(request.id, true).await.unwrap();
    assert_eq!(
        settled.status,
        tamarind_db::entities::sea_orm_active_enums::TransactionStatus::Completed
    );

    // Balance and ceiling return to zero; the ledger nets out.
    let accounts = AccountRepository::new(db.clone());
    assert_eq!(accounts.balance(account.id).await.unwrap(), dec!(0.00));
    let profile = guarantor_profiles::Entity::find_by_id(profile.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.max_guarantee_amount, dec!(0.00));

    let journal_count = journals::Entity::find()
        .filter(journals::Column::ReferenceId.is_in([request.id, settled.id]))
        .all(&db)
        .await
        .unwrap()
        .len();
    assert_eq!(journal_count, 1, "withdrawal posts exactly one journal");
}

#[tokio::test]
async fn concurrent_deposits_serialise_on_the_account_row() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    let savings_type =
        common::create_product_type(&db, ProductKind::Savings, None, None, None).await;
    let member = common::create_member(&db, false).await;
    let account = common::account_for(&db, member.id, savings_type.id).await;

    let deposits = (0..8).map(|_| {
        let db = db.clone();
        let account_id = account.id;
        let admin_id = admin.id;
        async move {
            TransactionEngine::new(db)
                .record_savings_deposit(common::record(account_id, dec!(125.00), admin_id))
                .await
        }
    });
    let results = futures::future::join_all(deposits).await;
    for result in results {
        result.expect("concurrent deposit failed");
    }

    // The final balance is the sum of all deltas, with no lost updates.
    let accounts = AccountRepository::new(db.clone());
    assert_eq!(accounts.balance(account.id).await.unwrap(), dec!(1000.00));
}

#[tokio::test]
async fn withdrawal_exceeding_balance_is_rejected() {
    let Some(db) = common::test_db().await else { return };

    let admin = common::create_member(&db, true).await;
    let savings_type =
        common::create_product_type(&db, ProductKind::Savings, None, None, None).await;
    let member = common::create_member(&db, false).await;
    let account = common::account_for(&db, member.id, savings_type.id).await;

    let engine = TransactionEngine::new(db.clone());
    engine
        .record_savings_deposit(common::record(account.id, dec!(100.00), admin.id))
        .await
        .unwrap();

    let result = engine
        .request_savings_withdrawal(common::record(account.id, dec!(100.01), member.id))
        .await;
    assert!(matches!(
        result,
        Err(tamarind_db::DbError::Validation { .. })
    ));
}
