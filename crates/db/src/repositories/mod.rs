//! Repository abstractions for data access.
//!
//! Repositories own database transactions, row locking, and the fan-out
//! side effects the domain requires to stay atomic (balance mutation plus
//! ledger posting, provisioning, commitment, release).

pub mod account;
pub mod bulk;
pub mod guarantee_request;
pub mod guarantor;
pub mod ident;
pub mod journal;
pub mod loan_application;
pub mod member;
pub mod product_type;
pub mod report;
pub mod transaction;

pub use account::AccountRepository;
pub use bulk::BulkRepository;
pub use guarantee_request::GuaranteeRequestRepository;
pub use guarantor::GuarantorRepository;
pub use journal::JournalRepository;
pub use loan_application::LoanApplicationRepository;
pub use member::MemberRepository;
pub use product_type::ProductTypeRepository;
pub use report::ReportRepository;
pub use transaction::TransactionEngine;

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};

/// Current timestamp in the column type used by the entities.
pub(crate) fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

/// Takes a transaction-scoped advisory lock on a string key.
///
/// Serialises daily-identity assignment and lazy template creation across
/// concurrent writers; the lock releases with the transaction.
pub(crate) async fn advisory_xact_lock<C: ConnectionTrait>(conn: &C, key: &str) -> Result<(), DbErr> {
    conn.query_one(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [key.into()],
    ))
    .await?;
    Ok(())
}
