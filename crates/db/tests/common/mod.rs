//! Shared fixtures for integration tests.
//!
//! These tests need a running Postgres. They connect through
//! `DATABASE_URL` and skip cleanly when it is unset, so a checkout
//! without a database still passes `cargo test`.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use tamarind_core::catalog::{FeeClassification, ProductKind};
use tamarind_core::transaction::PaymentMethod;
use tamarind_db::migration::{Migrator, MigratorTrait};
use tamarind_db::repositories::member::NewMember;
use tamarind_db::repositories::product_type::NewProductType;
use tamarind_db::repositories::transaction::RecordTransaction;
use tamarind_db::{MemberRepository, ProductTypeRepository, TransactionEngine};
use tamarind_shared::config::MemberDefaults;
use tamarind_shared::types::money::Currency;

static MIGRATED: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();

/// Connects and migrates, or `None` when no database is configured.
/// Migrations run once per test binary even with parallel tests.
pub async fn test_db() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };
    let db = tamarind_db::connect(&url)
        .await
        .expect("failed to connect to test database");
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None).await.expect("migrations failed");
        })
        .await;
    Some(db)
}

/// Enrols a member with a unique email.
pub async fn create_member(db: &DatabaseConnection, admin: bool) -> tamarind_db::entities::members::Model {
    let repo = MemberRepository::new(db.clone(), MemberDefaults::default());
    repo.create(NewMember {
        first_name: "Test".to_string(),
        last_name: "Member".to_string(),
        email: format!("member-{}@tamarind.test", Uuid::new_v4()),
        phone: None,
        password: "correct-horse-battery".to_string(),
        is_system_admin: admin,
        is_superuser: false,
    })
    .await
    .expect("member creation failed")
}

/// Registers a product type with a unique name.
pub async fn create_product_type(
    db: &DatabaseConnection,
    kind: ProductKind,
    interest_rate: Option<Decimal>,
    standard_amount: Option<Decimal>,
    fee_classification: Option<FeeClassification>,
) -> tamarind_db::entities::product_types::Model {
    let repo = ProductTypeRepository::new(db.clone());
    let (created, _report) = repo
        .create(NewProductType {
            kind,
            name: format!("{kind} {}", Uuid::new_v4()),
            description: None,
            interest_rate,
            standard_amount,
            fee_classification,
        })
        .await
        .expect("product type creation failed");
    created
}

/// The member's account for a product type.
pub async fn account_for(
    db: &DatabaseConnection,
    member_id: Uuid,
    product_type_id: Uuid,
) -> tamarind_db::entities::accounts::Model {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    use tamarind_db::entities::accounts;

    accounts::Entity::find()
        .filter(accounts::Column::MemberId.eq(member_id))
        .filter(accounts::Column::ProductTypeId.eq(product_type_id))
        .one(db)
        .await
        .expect("account query failed")
        .expect("account was not provisioned")
}

/// A transaction input with sane defaults for tests.
pub fn record(account_id: Uuid, amount: Decimal, recorded_by: Uuid) -> RecordTransaction {
    RecordTransaction {
        account_id,
        amount,
        payment_method: PaymentMethod::Cash,
        currency: Currency::default(),
        transaction_date: Utc::now().date_naive(),
        receipt_number: None,
        description: None,
        recorded_by,
    }
}

/// Deposits savings through the engine.
pub async fn deposit_savings(
    db: &DatabaseConnection,
    account_id: Uuid,
    amount: Decimal,
    recorded_by: Uuid,
) {
    TransactionEngine::new(db.clone())
        .record_savings_deposit(record(account_id, amount, recorded_by))
        .await
        .expect("savings deposit failed");
}

/// Looks up a GL account id by code.
pub async fn gl_account_id(db: &DatabaseConnection, code: &str) -> Uuid {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    use tamarind_db::entities::gl_accounts;

    gl_accounts::Entity::find()
        .filter(gl_accounts::Column::Code.eq(code))
        .one(db)
        .await
        .expect("gl account query failed")
        .expect("gl account missing from seed chart")
        .id
}
