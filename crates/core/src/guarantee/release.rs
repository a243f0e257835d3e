//! Proportional release of guarantee commitments on loan repayment.
//!
//! Each repayment releases guarantors in proportion to the repaid share of
//! the originally requested amount. A per-guarantee running balance tracks
//! how much of each pledge is still held; the actually-applied reduction
//! is floored so a profile's committed amount never goes negative.

use rust_decimal::Decimal;

use tamarind_shared::types::money::round2;

/// One accepted guarantee of the disbursed application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuaranteeShare {
    /// Amount originally guaranteed.
    pub guaranteed_amount: Decimal,
    /// Remaining held portion of the pledge.
    pub outstanding_amount: Decimal,
    /// The guarantor profile's committed total.
    pub committed_amount: Decimal,
}

/// The computed release for one guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDelta {
    /// Raw proportional release (`guaranteed * ratio`).
    pub release: Decimal,
    /// Reduction actually applied to the running balance.
    pub delta: Decimal,
    /// Running balance after the release.
    pub new_outstanding: Decimal,
    /// Profile committed total after the release.
    pub new_committed: Decimal,
}

/// Computes the proportional release for every guarantee of an
/// application after a repayment.
///
/// `ratio = repayment_amount / original_requested_amount`. A zero or
/// negative requested amount yields no releases.
#[must_use]
pub fn proportional_release(
    repayment_amount: Decimal,
    original_requested_amount: Decimal,
    shares: &[GuaranteeShare],
) -> Vec<ReleaseDelta> {
    if original_requested_amount <= Decimal::ZERO || repayment_amount <= Decimal::ZERO {
        return shares
            .iter()
            .map(|share| ReleaseDelta {
                release: Decimal::ZERO,
                delta: Decimal::ZERO,
                new_outstanding: share.outstanding_amount,
                new_committed: share.committed_amount,
            })
            .collect();
    }

    let ratio = repayment_amount / original_requested_amount;

    shares
        .iter()
        .map(|share| {
            let release = round2(share.guaranteed_amount * ratio);
            let new_outstanding = (share.outstanding_amount - release).max(Decimal::ZERO);
            let delta = share.outstanding_amount - new_outstanding;
            let new_committed = (share.committed_amount - delta).max(Decimal::ZERO);
            ReleaseDelta {
                release,
                delta,
                new_outstanding,
                new_committed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn share(guaranteed: Decimal, outstanding: Decimal, committed: Decimal) -> GuaranteeShare {
        GuaranteeShare {
            guaranteed_amount: guaranteed,
            outstanding_amount: outstanding,
            committed_amount: committed,
        }
    }

    #[test]
    fn test_ten_percent_repayment_releases_ten_percent() {
        let deltas = proportional_release(
            dec!(6000),
            dec!(60000),
            &[share(dec!(60000), dec!(60000), dec!(60000))],
        );
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].release, dec!(6000.00));
        assert_eq!(deltas[0].delta, dec!(6000.00));
        assert_eq!(deltas[0].new_outstanding, dec!(54000.00));
        assert_eq!(deltas[0].new_committed, dec!(54000.00));
    }

    #[test]
    fn test_release_split_across_guarantors() {
        let deltas = proportional_release(
            dec!(10000),
            dec!(100000),
            &[
                share(dec!(60000), dec!(60000), dec!(80000)),
                share(dec!(40000), dec!(40000), dec!(40000)),
            ],
        );
        assert_eq!(deltas[0].delta, dec!(6000.00));
        assert_eq!(deltas[0].new_committed, dec!(74000.00));
        assert_eq!(deltas[1].delta, dec!(4000.00));
        assert_eq!(deltas[1].new_committed, dec!(36000.00));
    }

    #[test]
    fn test_release_floors_outstanding_at_zero() {
        // Final repayment overshoots the remaining pledge.
        let deltas = proportional_release(
            dec!(30000),
            dec!(60000),
            &[share(dec!(60000), dec!(10000), dec!(15000))],
        );
        assert_eq!(deltas[0].release, dec!(30000.00));
        assert_eq!(deltas[0].delta, dec!(10000.00));
        assert_eq!(deltas[0].new_outstanding, dec!(0));
        assert_eq!(deltas[0].new_committed, dec!(5000.00));
    }

    #[test]
    fn test_committed_floors_at_zero() {
        let deltas = proportional_release(
            dec!(60000),
            dec!(60000),
            &[share(dec!(60000), dec!(60000), dec!(40000))],
        );
        assert_eq!(deltas[0].delta, dec!(60000.00));
        assert_eq!(deltas[0].new_committed, dec!(0));
    }

    #[test]
    fn test_zero_requested_amount_releases_nothing() {
        let deltas = proportional_release(
            dec!(6000),
            dec!(0),
            &[share(dec!(60000), dec!(60000), dec!(60000))],
        );
        assert_eq!(deltas[0].delta, dec!(0));
        assert_eq!(deltas[0].new_outstanding, dec!(60000));
    }

    proptest! {
        /// Full repayment in any number of instalments releases exactly the
        /// guaranteed amount (invariant 12).
        #[test]
        fn prop_full_repayment_releases_everything(
            guaranteed_minor in 10_000i64..100_000_000i64,
            instalments in 1u32..24u32,
        ) {
            let guaranteed = Decimal::new(guaranteed_minor, 2);
            let requested = guaranteed;
            let instalment = requested / Decimal::from(instalments);

            let mut current = share(guaranteed, guaranteed, guaranteed);
            let mut total_delta = Decimal::ZERO;
            let mut repaid = Decimal::ZERO;

            for i in 0..instalments {
                // Final instalment clears the exact remainder.
                let amount = if i == instalments - 1 {
                    requested - repaid
                } else {
                    round2(instalment)
                };
                repaid += amount;
                let deltas = proportional_release(amount, requested, &[current]);
                total_delta += deltas[0].delta;
                current.outstanding_amount = deltas[0].new_outstanding;
                current.committed_amount = deltas[0].new_committed;
            }

            prop_assert_eq!(total_delta, guaranteed);
            prop_assert_eq!(current.outstanding_amount, Decimal::ZERO);
            prop_assert_eq!(current.committed_amount, Decimal::ZERO);
        }
    }
}
