//! Guarantor capacity arithmetic.
//!
//! Invariants enforced here:
//! - `max_guarantee_amount` equals the sum of the owner's savings balances
//!   whenever recomputed (the repository recomputes on savings mutation).
//! - `0 <= committed_guarantee_amount <= max_guarantee_amount`.

use rust_decimal::Decimal;

use super::error::GuaranteeError;

/// Free capacity on a profile: `max - committed`, floored at zero.
#[must_use]
pub fn available_capacity(max: Decimal, committed: Decimal) -> Decimal {
    (max - committed).max(Decimal::ZERO)
}

/// Paper check performed when a guarantor accepts a request. No capacity
/// is reserved yet; the real commitment happens at submission.
///
/// # Errors
///
/// Rejects non-positive amounts, ineligible guarantors, and amounts above
/// the free capacity.
pub fn check_acceptance(
    amount: Decimal,
    max: Decimal,
    committed: Decimal,
    is_eligible: bool,
) -> Result<(), GuaranteeError> {
    if amount <= Decimal::ZERO {
        return Err(GuaranteeError::NonPositiveAmount(amount));
    }
    if !is_eligible {
        return Err(GuaranteeError::NotEligible);
    }
    let available = available_capacity(max, committed);
    if amount > available {
        return Err(GuaranteeError::ExceedsCapacity { amount, available });
    }
    Ok(())
}

/// Verifies and applies a commitment at submission time. The caller holds
/// a row lock on the profile.
///
/// # Errors
///
/// Returns `CommitmentOverflow` when the commitment would break the
/// capacity invariant; the caller rolls the whole submission back.
pub fn commit(
    committed: Decimal,
    amount: Decimal,
    max: Decimal,
) -> Result<Decimal, GuaranteeError> {
    let next = committed + amount;
    if next > max {
        return Err(GuaranteeError::CommitmentOverflow {
            amount,
            committed,
            max,
        });
    }
    Ok(next)
}

/// Releases committed capacity, floored at zero. Used on decline and on
/// proportional release.
#[must_use]
pub fn release(committed: Decimal, amount: Decimal) -> Decimal {
    (committed - amount).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_available_capacity() {
        assert_eq!(available_capacity(dec!(100000), dec!(40000)), dec!(60000));
        assert_eq!(available_capacity(dec!(100000), dec!(100000)), dec!(0));
        // Floored when stored data predates a savings withdrawal.
        assert_eq!(available_capacity(dec!(30000), dec!(40000)), dec!(0));
    }

    #[test]
    fn test_check_acceptance_ok() {
        assert!(check_acceptance(dec!(50000), dec!(100000), dec!(20000), true).is_ok());
    }

    #[test]
    fn test_check_acceptance_rejects_non_positive() {
        assert!(matches!(
            check_acceptance(dec!(0), dec!(100000), dec!(0), true),
            Err(GuaranteeError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_check_acceptance_rejects_ineligible() {
        assert!(matches!(
            check_acceptance(dec!(100), dec!(100000), dec!(0), false),
            Err(GuaranteeError::NotEligible)
        ));
    }

    #[test]
    fn test_check_acceptance_rejects_over_capacity() {
        let err = check_acceptance(dec!(90000), dec!(100000), dec!(20000), true).unwrap_err();
        assert!(matches!(
            err,
            GuaranteeError::ExceedsCapacity {
                available,
                ..
            } if available == dec!(80000)
        ));
    }

    #[test]
    fn test_commit_within_capacity() {
        assert_eq!(commit(dec!(20000), dec!(30000), dec!(100000)).unwrap(), dec!(50000));
    }

    #[test]
    fn test_commit_overflow() {
        assert!(matches!(
            commit(dec!(90000), dec!(20000), dec!(100000)),
            Err(GuaranteeError::CommitmentOverflow { .. })
        ));
    }

    #[test]
    fn test_release_floors_at_zero() {
        assert_eq!(release(dec!(50000), dec!(20000)), dec!(30000));
        assert_eq!(release(dec!(50000), dec!(60000)), dec!(0));
    }
}
