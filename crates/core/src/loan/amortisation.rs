//! Reducing-balance amortisation schedules.
//!
//! Two modes: fixed term (solve for the payment) and fixed payment (solve
//! for the term, capped at 360 months). Interest accrues monthly on the
//! outstanding balance; the final period retires the residual so the
//! schedule always closes at zero. All monetary results are rounded
//! half-up to 2 decimal places.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_shared::types::money::round2;

use super::error::AmortisationError;

/// Hard cap on fixed-payment schedules.
pub const TERM_CAP_MONTHS: u32 = 360;

/// How a projection is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// Given the term, solve for the monthly payment.
    FixedTerm,
    /// Given the monthly payment, solve for the term.
    FixedPayment,
}

impl CalculationMode {
    /// String form used in persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedTerm => "fixed_term",
            Self::FixedPayment => "fixed_payment",
        }
    }
}

/// Repayment due-date cadence. Affects scheduling only; interest accrues
/// monthly regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentFrequency {
    /// Every day.
    Daily,
    /// Every 7 days.
    Weekly,
    /// Every 14 days.
    Biweekly,
    /// Calendar months, clamped to month end.
    Monthly,
    /// Every 3 calendar months.
    Quarterly,
    /// Every 12 calendar months.
    Annually,
}

impl RepaymentFrequency {
    /// Due date of the given period (1-indexed), stepped from the start
    /// date. Month-based cadences respect month ends by always stepping
    /// from the anchor date.
    ///
    /// # Errors
    ///
    /// Returns `AmortisationError::DateOutOfRange` if the date leaves the
    /// supported calendar range.
    pub fn due_date(self, start: NaiveDate, period: u32) -> Result<NaiveDate, AmortisationError> {
        let stepped = match self {
            Self::Daily => start.checked_add_days(chrono::Days::new(u64::from(period))),
            Self::Weekly => start.checked_add_days(chrono::Days::new(u64::from(period) * 7)),
            Self::Biweekly => start.checked_add_days(chrono::Days::new(u64::from(period) * 14)),
            Self::Monthly => start.checked_add_months(Months::new(period)),
            Self::Quarterly => start.checked_add_months(Months::new(period * 3)),
            Self::Annually => start.checked_add_months(Months::new(period * 12)),
        };
        stepped.ok_or(AmortisationError::DateOutOfRange(period))
    }

    /// String form used in persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annually => "annually",
        }
    }
}

/// One period of an amortisation schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-indexed period number.
    pub period: u32,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Principal component.
    pub principal_due: Decimal,
    /// Interest component.
    pub interest_due: Decimal,
    /// Total due this period.
    pub total_due: Decimal,
    /// Outstanding balance after this payment.
    pub balance_after: Decimal,
}

/// A computed projection: totals plus the full schedule. Stored as an
/// immutable snapshot on the loan application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Term in months.
    pub term_months: u32,
    /// Monthly payment.
    pub monthly_payment: Decimal,
    /// Total interest over the schedule.
    pub total_interest: Decimal,
    /// Principal plus total interest.
    pub total_repayment: Decimal,
    /// Per-period breakdown.
    pub schedule: Vec<ScheduleEntry>,
}

/// Monthly rate from an annual percentage: `annual_rate_pct / 100 / 12`.
#[must_use]
pub fn monthly_rate(annual_rate_pct: Decimal) -> Decimal {
    annual_rate_pct / Decimal::from(1200)
}

fn decimal_pow(base: Decimal, exp: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..exp {
        result *= base;
    }
    result
}

fn validate_principal_and_rate(
    principal: Decimal,
    annual_rate_pct: Decimal,
) -> Result<(), AmortisationError> {
    if principal <= Decimal::ZERO {
        return Err(AmortisationError::NonPositivePrincipal(principal));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(AmortisationError::NegativeRate(annual_rate_pct));
    }
    Ok(())
}

/// Builds the schedule for a known payment and term, retiring the residual
/// balance in the last period.
fn build_schedule(
    principal: Decimal,
    rate: Decimal,
    payment: Decimal,
    term: u32,
    start: NaiveDate,
    frequency: RepaymentFrequency,
) -> Result<Vec<ScheduleEntry>, AmortisationError> {
    let mut schedule = Vec::with_capacity(term as usize);
    let mut balance = principal;

    for period in 1..=term {
        let interest = round2(balance * rate);
        let mut principal_due = round2(payment - interest);
        if period == term || principal_due > balance {
            principal_due = balance;
        }
        let total_due = round2(principal_due + interest);
        balance = round2(balance - principal_due);

        schedule.push(ScheduleEntry {
            period,
            due_date: frequency.due_date(start, period)?,
            principal_due,
            interest_due: interest,
            total_due,
            balance_after: balance,
        });
    }

    Ok(schedule)
}

fn totals(principal: Decimal, payment: Decimal, schedule: Vec<ScheduleEntry>) -> Projection {
    let total_interest = round2(schedule.iter().map(|e| e.interest_due).sum());
    Projection {
        term_months: u32::try_from(schedule.len()).unwrap_or(u32::MAX),
        monthly_payment: payment,
        total_interest,
        total_repayment: round2(principal + total_interest),
        schedule,
    }
}

/// Fixed-term projection: given the principal, annual rate, and term,
/// solve for the monthly payment.
///
/// With a zero rate the payment is `principal / term`; otherwise the
/// standard annuity formula `P · r(1+r)^n / ((1+r)^n − 1)` applies,
/// rounded half-up to 2 decimals.
///
/// # Errors
///
/// Returns an error for a non-positive principal, a negative rate, or a
/// zero term.
pub fn fixed_term(
    principal: Decimal,
    annual_rate_pct: Decimal,
    term_months: u32,
    start: NaiveDate,
    frequency: RepaymentFrequency,
) -> Result<Projection, AmortisationError> {
    validate_principal_and_rate(principal, annual_rate_pct)?;
    if term_months == 0 {
        return Err(AmortisationError::NonPositiveTerm);
    }

    let rate = monthly_rate(annual_rate_pct);
    let payment = if rate.is_zero() {
        round2(principal / Decimal::from(term_months))
    } else {
        let factor = decimal_pow(Decimal::ONE + rate, term_months);
        round2(principal * rate * factor / (factor - Decimal::ONE))
    };

    let schedule = build_schedule(principal, rate, payment, term_months, start, frequency)?;
    Ok(totals(principal, payment, schedule))
}

/// Fixed-payment projection: given the principal, annual rate, and monthly
/// payment, solve for the term by iterating the reducing balance.
///
/// # Errors
///
/// Returns `PaymentTooSmall` when the payment does not exceed the first
/// period's interest (the term would be unbounded) and `TermCapExceeded`
/// when the schedule runs past 360 months.
pub fn fixed_payment(
    principal: Decimal,
    annual_rate_pct: Decimal,
    payment: Decimal,
    start: NaiveDate,
    frequency: RepaymentFrequency,
) -> Result<Projection, AmortisationError> {
    validate_principal_and_rate(principal, annual_rate_pct)?;

    let rate = monthly_rate(annual_rate_pct);
    let first_interest = round2(principal * rate);
    if payment <= first_interest {
        return Err(AmortisationError::PaymentTooSmall {
            payment,
            minimum: first_interest,
        });
    }

    let mut schedule = Vec::new();
    let mut balance = principal;
    let mut period = 0u32;

    while balance > Decimal::ZERO {
        period += 1;
        if period > TERM_CAP_MONTHS {
            return Err(AmortisationError::TermCapExceeded(TERM_CAP_MONTHS));
        }

        let interest = round2(balance * rate);
        let mut principal_due = round2(payment - interest);
        if principal_due > balance {
            principal_due = balance;
        }
        let total_due = round2(principal_due + interest);
        balance = round2(balance - principal_due);

        schedule.push(ScheduleEntry {
            period,
            due_date: frequency.due_date(start, period)?,
            principal_due,
            interest_due: interest,
            total_due,
            balance_after: balance,
        });
    }

    Ok(totals(principal, payment, schedule))
}
