//! Reference and identity generation.
//!
//! All human-facing identifiers are generated here: 12-character references,
//! member numbers, type-prefixed account numbers, and the format of
//! daily-sequenced transaction identities. Uniqueness is enforced at the
//! persistence layer; generators are retried on collision with a bounded
//! budget.

use chrono::{Datelike, NaiveDate};
use rand::Rng;

use crate::catalog::ProductKind;

/// Length of a short human-readable reference.
pub const REFERENCE_LEN: usize = 12;

/// Retry budget for regeneration after a unique-violation.
pub const COLLISION_RETRY_BUDGET: u32 = 5;

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a 12-character upper-case alphanumeric reference.
///
/// Characters are drawn uniformly from `[A-Z0-9]` using the thread-local
/// CSPRNG.
#[must_use]
pub fn generate_reference() -> String {
    let mut rng = rand::rng();
    (0..REFERENCE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..REFERENCE_CHARSET.len());
            char::from(REFERENCE_CHARSET[idx])
        })
        .collect()
}

fn random_digits(count: usize) -> String {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Generates a member number: `MBR` + two-digit year + 6 random digits.
#[must_use]
pub fn generate_member_number(today: NaiveDate) -> String {
    format!("MBR{:02}{}", today.year() % 100, random_digits(6))
}

/// Generates a type-prefixed account number.
///
/// Savings `WM<YY><10 digits>`, venture `VN<YY><8 digits>`, loan
/// `LN<YY><8 digits>`, fee `<YY><8 digits>`.
#[must_use]
pub fn generate_account_number(kind: ProductKind, today: NaiveDate) -> String {
    format!(
        "{}{:02}{}",
        kind.account_prefix(),
        today.year() % 100,
        random_digits(kind.account_digits())
    )
}

/// Formats a daily-sequenced transaction identity:
/// `<prefix><YYYYMMDD><NNNN>`.
///
/// The sequence number is `count(existing identities with that prefix and
/// date) + 1`, computed by the repository under an exclusive lock on the
/// (prefix, date) pair.
#[must_use]
pub fn format_daily_identity(prefix: &str, date: NaiveDate, sequence: u32) -> String {
    format!("{prefix}{}{sequence:04}", date.format("%Y%m%d"))
}

/// Formats the reference prefix of a bulk batch:
/// `<TYPE>-BULK-<YYYYMMDD>`.
#[must_use]
pub fn format_bulk_reference(type_name: &str, date: NaiveDate) -> String {
    format!(
        "{}-BULK-{}",
        type_name.to_uppercase(),
        date.format("%Y%m%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reference_shape() {
        let reference = generate_reference();
        assert_eq!(reference.len(), REFERENCE_LEN);
        assert!(
            reference
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn test_references_are_collision_resistant() {
        let refs: HashSet<String> = (0..1000).map(|_| generate_reference()).collect();
        assert_eq!(refs.len(), 1000);
    }

    #[test]
    fn test_member_number_shape() {
        let number = generate_member_number(date(2026, 8, 6));
        assert_eq!(number.len(), 11);
        assert!(number.starts_with("MBR26"));
        assert!(number[5..].bytes().all(|b| b.is_ascii_digit()));
    }

    #[rstest]
    #[case(ProductKind::Savings, "WM26", 14)]
    #[case(ProductKind::Venture, "VN26", 12)]
    #[case(ProductKind::Loan, "LN26", 12)]
    #[case(ProductKind::Fee, "26", 10)]
    fn test_account_number_shapes(
        #[case] kind: ProductKind,
        #[case] prefix: &str,
        #[case] len: usize,
    ) {
        let number = generate_account_number(kind, date(2026, 8, 6));
        assert!(number.starts_with(prefix));
        assert_eq!(number.len(), len);
        assert!(number[prefix.len()..].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_daily_identity_format() {
        assert_eq!(
            format_daily_identity("SD", date(2026, 8, 6), 1),
            "SD202608060001"
        );
        assert_eq!(
            format_daily_identity("LR", date(2026, 12, 31), 423),
            "LR202612310423"
        );
    }

    #[test]
    fn test_bulk_reference_format() {
        assert_eq!(
            format_bulk_reference("savings_deposit", date(2026, 8, 6)),
            "SAVINGS_DEPOSIT-BULK-20260806"
        );
    }
}
