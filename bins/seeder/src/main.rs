//! Database seeder for Tamarind development and testing.
//!
//! Seeds an administrator, the four standard product types, and replays
//! guarantor commitments so a fresh database is immediately usable.
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use std::str::FromStr;

use tamarind_core::catalog::{FeeClassification, ProductKind};
use tamarind_db::repositories::member::NewMember;
use tamarind_db::repositories::product_type::NewProductType;
use tamarind_db::{GuarantorRepository, MemberRepository, ProductTypeRepository};
use tamarind_shared::config::MemberDefaults;

/// Development administrator login.
const ADMIN_EMAIL: &str = "admin@tamarind.dev";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tamarind_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding administrator...");
    seed_admin(&db).await;

    println!("Seeding product types...");
    seed_product_types(&db).await;

    println!("Replaying guarantor commitments...");
    match GuarantorRepository::new(db.clone()).replay_commitments().await {
        Ok(updated) => println!("  Rebuilt {updated} profiles"),
        Err(e) => eprintln!("Failed to replay commitments: {e}"),
    }

    println!("Seeding complete!");
}

/// Seeds the development administrator if absent.
async fn seed_admin(db: &sea_orm::DatabaseConnection) {
    let members = MemberRepository::new(db.clone(), MemberDefaults::default());

    if members.find_by_email(ADMIN_EMAIL).await.is_ok() {
        println!("  Administrator already exists, skipping...");
        return;
    }

    match members
        .create(NewMember {
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            email: ADMIN_EMAIL.to_string(),
            phone: None,
            password: "admin-dev-password".to_string(),
            is_system_admin: true,
            is_superuser: true,
        })
        .await
    {
        Ok(admin) => println!("  Created administrator {}", admin.member_number),
        Err(e) => eprintln!("Failed to seed administrator: {e}"),
    }
}

/// Seeds one product type of each kind, provisioning accounts for every
/// member already enrolled.
async fn seed_product_types(db: &sea_orm::DatabaseConnection) {
    let types = ProductTypeRepository::new(db.clone());

    let seeds = [
        NewProductType {
            kind: ProductKind::Savings,
            name: "Main Savings".to_string(),
            description: Some("Withdrawable member savings".to_string()),
            interest_rate: None,
            standard_amount: None,
            fee_classification: None,
        },
        NewProductType {
            kind: ProductKind::Venture,
            name: "Venture Fund".to_string(),
            description: Some("Pooled venture investments".to_string()),
            interest_rate: Some(Decimal::from_str("8.0").unwrap()),
            standard_amount: None,
            fee_classification: None,
        },
        NewProductType {
            kind: ProductKind::Loan,
            name: "Development Loan".to_string(),
            description: Some("Reducing-balance member loans".to_string()),
            interest_rate: Some(Decimal::from_str("10.0").unwrap()),
            standard_amount: None,
            fee_classification: None,
        },
        NewProductType {
            kind: ProductKind::Fee,
            name: "Registration Fee".to_string(),
            description: Some("One-off enrolment fee".to_string()),
            interest_rate: None,
            standard_amount: Some(Decimal::from_str("1000.00").unwrap()),
            fee_classification: Some(FeeClassification::Income),
        },
    ];

    for seed in seeds {
        let name = seed.name.clone();
        match types.create(seed).await {
            Ok((_, report)) => println!(
                "  {name}: {} accounts created, {} skipped, {} failed",
                report.created, report.skipped, report.failed
            ),
            Err(tamarind_db::DbError::Conflict(_)) => {
                println!("  {name} already exists, skipping...");
            }
            Err(e) => eprintln!("Failed to seed {name}: {e}"),
        }
    }
}
