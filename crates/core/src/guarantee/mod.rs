//! Guarantor capacity and guarantee request rules.
//!
//! A guarantor profile tracks how much of a member's savings is pledged to
//! other members' loans. Acceptance of a guarantee request is a promise
//! only; capacity is committed when the application is submitted and
//! released proportionally as the loan is repaid.

pub mod capacity;
pub mod error;
pub mod release;
pub mod request;

pub use capacity::available_capacity;
pub use error::GuaranteeError;
pub use release::{GuaranteeShare, ReleaseDelta, proportional_release};
pub use request::GuaranteeStatus;
