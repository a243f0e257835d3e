//! Guarantee request lifecycle rules.

use serde::{Deserialize, Serialize};

use super::error::GuaranteeError;

/// Guarantee request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuaranteeStatus {
    /// Awaiting the guarantor's answer.
    Pending,
    /// Guarantor accepted an amount.
    Accepted,
    /// Guarantor declined.
    Declined,
    /// Cancelled (application declined or cancelled).
    Cancelled,
}

impl GuaranteeStatus {
    /// Guarantor answers (accept or decline, including amount changes) are
    /// permitted only from these states.
    #[must_use]
    pub const fn is_answerable(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// String form used in persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for GuaranteeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks a guarantor's answer transition. The application-side window
/// (pre-submission only) is verified by the caller against the
/// application status.
///
/// # Errors
///
/// Returns `GuaranteeError::InvalidTransition` when the request is no
/// longer answerable.
pub fn validate_answer(
    from: GuaranteeStatus,
    to: GuaranteeStatus,
) -> Result<(), GuaranteeError> {
    let allowed = from.is_answerable()
        && matches!(to, GuaranteeStatus::Accepted | GuaranteeStatus::Declined);
    if allowed {
        Ok(())
    } else {
        Err(GuaranteeError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_from_pending() {
        assert!(validate_answer(GuaranteeStatus::Pending, GuaranteeStatus::Accepted).is_ok());
    }

    #[test]
    fn test_amend_accepted_amount() {
        // A guarantor may revise an accepted amount pre-submission.
        assert!(validate_answer(GuaranteeStatus::Accepted, GuaranteeStatus::Accepted).is_ok());
        assert!(validate_answer(GuaranteeStatus::Accepted, GuaranteeStatus::Declined).is_ok());
    }

    #[test]
    fn test_declined_is_final() {
        assert!(validate_answer(GuaranteeStatus::Declined, GuaranteeStatus::Accepted).is_err());
    }

    #[test]
    fn test_cancelled_is_final() {
        assert!(validate_answer(GuaranteeStatus::Cancelled, GuaranteeStatus::Accepted).is_err());
        assert!(validate_answer(GuaranteeStatus::Cancelled, GuaranteeStatus::Declined).is_err());
    }

    #[test]
    fn test_cannot_answer_to_pending() {
        assert!(validate_answer(GuaranteeStatus::Pending, GuaranteeStatus::Pending).is_err());
        assert!(validate_answer(GuaranteeStatus::Pending, GuaranteeStatus::Cancelled).is_err());
    }
}
