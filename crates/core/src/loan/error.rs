//! Loan workflow and amortisation error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::state::ApplicationStatus;

/// Errors raised by loan application workflow transitions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The requested transition is not permitted from the current status.
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ApplicationStatus,
        /// Requested status.
        to: ApplicationStatus,
    },

    /// A second submit of an already-submitted application.
    #[error("Already submitted")]
    AlreadySubmitted,

    /// Submission requires full coverage.
    #[error("application is not fully covered; {remaining} remaining")]
    NotFullyCovered {
        /// Amount still uncovered.
        remaining: Decimal,
    },

    /// The application reached a terminal state.
    #[error("application is {0} and cannot change")]
    Terminal(ApplicationStatus),
}

/// Errors raised by the amortisation calculator.
#[derive(Debug, Error)]
pub enum AmortisationError {
    /// Principal must be positive.
    #[error("principal must be positive, got {0}")]
    NonPositivePrincipal(Decimal),

    /// Term must be at least one month.
    #[error("term must be at least 1 month")]
    NonPositiveTerm,

    /// Annual rate must not be negative.
    #[error("interest rate must not be negative, got {0}")]
    NegativeRate(Decimal),

    /// Fixed-payment mode requires the payment to exceed the first
    /// period's interest, otherwise the term is unbounded.
    #[error("monthly payment {payment} must exceed first-period interest {minimum}")]
    PaymentTooSmall {
        /// Supplied monthly payment.
        payment: Decimal,
        /// First-period interest on the full principal.
        minimum: Decimal,
    },

    /// Fixed-payment schedules are capped at 360 months.
    #[error("schedule exceeds the {0}-month cap")]
    TermCapExceeded(u32),

    /// The start date stepped outside the supported calendar range.
    #[error("due date out of range for period {0}")]
    DateOutOfRange(u32),
}
