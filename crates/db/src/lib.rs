//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions that own transactions and row locking
//! - Database migrations, including the chart-of-accounts bootstrap

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

pub use error::{DbError, DbResult};
pub use repositories::{
    AccountRepository, BulkRepository, GuaranteeRequestRepository, GuarantorRepository,
    JournalRepository, LoanApplicationRepository, MemberRepository, ProductTypeRepository,
    ReportRepository, TransactionEngine,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
