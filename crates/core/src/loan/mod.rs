//! Loan application domain logic.
//!
//! - `state` - application workflow transitions
//! - `amortisation` - reducing-balance schedule calculator
//! - `coverage` - guarantee coverage arithmetic

pub mod amortisation;
pub mod coverage;
pub mod error;
pub mod state;

pub use amortisation::{
    CalculationMode, Projection, RepaymentFrequency, ScheduleEntry, fixed_payment, fixed_term,
};
pub use coverage::{Coverage, CoverageInputs};
pub use error::{AmortisationError, WorkflowError};
pub use state::{ApplicationStatus, LoanWorkflow};
