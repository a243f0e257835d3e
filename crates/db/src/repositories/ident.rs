//! Persistence-side identity generation.
//!
//! Formats come from `tamarind_core::ident`; this module adds the
//! uniqueness checks and the (prefix, date) serialisation that need the
//! database. 12-character references go in unchecked - the space is large
//! enough that the unique index is the only guard they need - while member
//! and account numbers, whose random part is 6-10 digits, are retried
//! against the table before insert.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use tamarind_core::catalog::ProductKind;
use tamarind_core::ident;

use super::advisory_xact_lock;
use crate::entities::{accounts, members, transactions};
use crate::error::{DbError, DbResult};

/// Generates a unique member number for today.
pub(crate) async fn unique_member_number<C: ConnectionTrait>(
    conn: &C,
    today: NaiveDate,
) -> DbResult<String> {
    for _ in 0..ident::COLLISION_RETRY_BUDGET {
        let candidate = ident::generate_member_number(today);
        let taken = members::Entity::find()
            .filter(members::Column::MemberNumber.eq(candidate.clone()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
    }
    Err(DbError::Conflict(
        "could not generate a unique member number".to_string(),
    ))
}

/// Generates a unique type-prefixed account number.
pub(crate) async fn unique_account_number<C: ConnectionTrait>(
    conn: &C,
    kind: ProductKind,
    today: NaiveDate,
) -> DbResult<String> {
    for _ in 0..ident::COLLISION_RETRY_BUDGET {
        let candidate = ident::generate_account_number(kind, today);
        let taken = accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(candidate.clone()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
    }
    Err(DbError::Conflict(
        "could not generate a unique account number".to_string(),
    ))
}

/// Computes the next daily-sequenced identity for a (prefix, date) pair.
///
/// Holds a transaction-scoped advisory lock on the pair so concurrent
/// writers can never observe the same count. Must run inside the same
/// transaction that inserts the row.
pub(crate) async fn next_daily_identity<C: ConnectionTrait>(
    conn: &C,
    prefix: &str,
    date: NaiveDate,
) -> DbResult<String> {
    let day_prefix = format!("{prefix}{}", date.format("%Y%m%d"));
    advisory_xact_lock(conn, &day_prefix).await?;

    let existing = transactions::Entity::find()
        .filter(transactions::Column::Identity.starts_with(day_prefix.as_str()))
        .count(conn)
        .await?;
    let sequence = u32::try_from(existing)
        .map_err(|_| DbError::Conflict("daily sequence exhausted".to_string()))?
        + 1;

    Ok(ident::format_daily_identity(prefix, date, sequence))
}
