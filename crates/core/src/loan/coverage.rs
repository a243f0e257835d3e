//! Guarantee coverage arithmetic.
//!
//! Coverage of an application is the applicant's own pledged savings plus
//! accepted guarantees from other members. An application may only be
//! submitted when coverage reaches the requested amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs to the coverage computation, assembled by the repository layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageInputs {
    /// Amount the member asked for.
    pub requested_amount: Decimal,
    /// Sum of the applicant's savings balances.
    pub total_savings: Decimal,
    /// Accepted amounts the applicant guarantees on OTHER live
    /// applications (status Submitted/Approved/Disbursed).
    pub committed_self_other: Decimal,
    /// The applicant's own pledge on this application.
    pub self_guaranteed_amount: Decimal,
    /// Sum of accepted guarantees from other members on this application.
    pub guaranteed_by_others: Decimal,
}

/// Computed coverage breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// Savings still available for self-guaranteeing.
    pub available_self: Decimal,
    /// Self pledge plus external accepted guarantees.
    pub effective_coverage: Decimal,
    /// Amount still uncovered.
    pub remaining_to_cover: Decimal,
    /// True when the requested amount is fully covered.
    pub is_fully_covered: bool,
}

impl Coverage {
    /// Computes the coverage breakdown for an application.
    #[must_use]
    pub fn compute(inputs: CoverageInputs) -> Self {
        let available_self =
            (inputs.total_savings - inputs.committed_self_other).max(Decimal::ZERO);
        let effective_coverage = inputs.self_guaranteed_amount + inputs.guaranteed_by_others;
        let remaining_to_cover =
            (inputs.requested_amount - effective_coverage).max(Decimal::ZERO);
        Self {
            available_self,
            effective_coverage,
            remaining_to_cover,
            is_fully_covered: remaining_to_cover.is_zero(),
        }
    }

    /// The auto-maximised self-guarantee applied when a member accepts an
    /// amendment: as much of the request as their free savings cover.
    #[must_use]
    pub fn auto_self_guarantee(&self, requested_amount: Decimal) -> Decimal {
        self.available_self.min(requested_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs() -> CoverageInputs {
        CoverageInputs {
            requested_amount: dec!(60000),
            total_savings: dec!(60000),
            committed_self_other: dec!(0),
            self_guaranteed_amount: dec!(0),
            guaranteed_by_others: dec!(0),
        }
    }

    #[test]
    fn test_uncovered_application() {
        let coverage = Coverage::compute(inputs());
        assert_eq!(coverage.available_self, dec!(60000));
        assert_eq!(coverage.effective_coverage, dec!(0));
        assert_eq!(coverage.remaining_to_cover, dec!(60000));
        assert!(!coverage.is_fully_covered);
    }

    #[test]
    fn test_fully_self_covered() {
        let coverage = Coverage::compute(CoverageInputs {
            self_guaranteed_amount: dec!(60000),
            ..inputs()
        });
        assert_eq!(coverage.remaining_to_cover, dec!(0));
        assert!(coverage.is_fully_covered);
    }

    #[test]
    fn test_mixed_coverage() {
        let coverage = Coverage::compute(CoverageInputs {
            requested_amount: dec!(100000),
            total_savings: dec!(40000),
            committed_self_other: dec!(10000),
            self_guaranteed_amount: dec!(30000),
            guaranteed_by_others: dec!(50000),
        });
        assert_eq!(coverage.available_self, dec!(30000));
        assert_eq!(coverage.effective_coverage, dec!(80000));
        assert_eq!(coverage.remaining_to_cover, dec!(20000));
        assert!(!coverage.is_fully_covered);
    }

    #[test]
    fn test_commitments_elsewhere_reduce_available_self() {
        let coverage = Coverage::compute(CoverageInputs {
            committed_self_other: dec!(70000),
            ..inputs()
        });
        // Floored at zero even when other commitments exceed savings.
        assert_eq!(coverage.available_self, dec!(0));
    }

    #[test]
    fn test_overcoverage_remains_zero() {
        let coverage = Coverage::compute(CoverageInputs {
            self_guaranteed_amount: dec!(40000),
            guaranteed_by_others: dec!(40000),
            ..inputs()
        });
        assert_eq!(coverage.remaining_to_cover, dec!(0));
        assert!(coverage.is_fully_covered);
    }

    #[test]
    fn test_auto_self_guarantee_is_bounded() {
        let coverage = Coverage::compute(inputs());
        assert_eq!(coverage.auto_self_guarantee(dec!(60000)), dec!(60000));
        assert_eq!(coverage.auto_self_guarantee(dec!(45000)), dec!(45000));

        let partial = Coverage::compute(CoverageInputs {
            total_savings: dec!(20000),
            ..inputs()
        });
        assert_eq!(partial.auto_self_guarantee(dec!(60000)), dec!(20000));
    }
}
