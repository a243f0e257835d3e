//! Loan application workflow state machine.
//!
//! Stateless transition checks in the style of a workflow service: each
//! function validates the current status and returns the next one. The
//! repository layer persists the result and performs the side effects
//! (commitments, account linking, disbursement postings).

use serde::{Deserialize, Serialize};

use super::error::WorkflowError;

/// Loan application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Created by the member; projection computed.
    Pending,
    /// Member handed the application to an administrator for amendment.
    ReadyForAmendment,
    /// Administrator finished amending; awaiting member acceptance.
    Amended,
    /// Member accepted; coverage below 100%.
    InProgress,
    /// Fully covered; member may submit.
    ReadyForSubmission,
    /// Submitted; guarantor capacity committed.
    Submitted,
    /// Approved by an administrator; loan account linked.
    Approved,
    /// Funds released. Terminal.
    Disbursed,
    /// Declined by an administrator; commitments reverted. Terminal.
    Declined,
    /// Cancelled by the member. Terminal.
    Cancelled,
}

impl ApplicationStatus {
    /// Returns true for states that permit no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Disbursed | Self::Declined | Self::Cancelled)
    }

    /// Returns true while guarantee requests may still be created or
    /// answered (pre-submission).
    #[must_use]
    pub const fn is_pre_submission(self) -> bool {
        matches!(
            self,
            Self::Pending
                | Self::ReadyForAmendment
                | Self::Amended
                | Self::InProgress
                | Self::ReadyForSubmission
        )
    }

    /// Returns true for the states in which accepted guarantees count as
    /// live commitments.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Submitted | Self::Approved | Self::Disbursed)
    }

    /// String form used in persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ReadyForAmendment => "ready_for_amendment",
            Self::Amended => "amended",
            Self::InProgress => "in_progress",
            Self::ReadyForSubmission => "ready_for_submission",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Disbursed => "disbursed",
            Self::Declined => "declined",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let human = match self {
            Self::Pending => "Pending",
            Self::ReadyForAmendment => "Ready for Amendment",
            Self::Amended => "Amended",
            Self::InProgress => "In Progress",
            Self::ReadyForSubmission => "Ready for Submission",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Disbursed => "Disbursed",
            Self::Declined => "Declined",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(human)
    }
}

/// Stateless transition checks for the application workflow.
pub struct LoanWorkflow;

impl LoanWorkflow {
    fn transition(
        from: ApplicationStatus,
        expected: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<ApplicationStatus, WorkflowError> {
        if from.is_terminal() {
            return Err(WorkflowError::Terminal(from));
        }
        if from == expected {
            Ok(to)
        } else {
            Err(WorkflowError::InvalidTransition { from, to })
        }
    }

    /// Member hands a pending application to an administrator.
    pub fn submit_for_amendment(
        from: ApplicationStatus,
    ) -> Result<ApplicationStatus, WorkflowError> {
        Self::transition(
            from,
            ApplicationStatus::Pending,
            ApplicationStatus::ReadyForAmendment,
        )
    }

    /// Administrator finishes amending.
    pub fn amend(from: ApplicationStatus) -> Result<ApplicationStatus, WorkflowError> {
        Self::transition(
            from,
            ApplicationStatus::ReadyForAmendment,
            ApplicationStatus::Amended,
        )
    }

    /// Member accepts the amendment. Lands in `ReadyForSubmission` when
    /// fully covered, `InProgress` otherwise.
    pub fn accept_amendment(
        from: ApplicationStatus,
        fully_covered: bool,
    ) -> Result<ApplicationStatus, WorkflowError> {
        let to = if fully_covered {
            ApplicationStatus::ReadyForSubmission
        } else {
            ApplicationStatus::InProgress
        };
        Self::transition(from, ApplicationStatus::Amended, to)
    }

    /// Member cancels an amended application.
    pub fn cancel(from: ApplicationStatus) -> Result<ApplicationStatus, WorkflowError> {
        Self::transition(from, ApplicationStatus::Amended, ApplicationStatus::Cancelled)
    }

    /// Coverage reached 100% while in progress.
    pub fn mark_ready_for_submission(
        from: ApplicationStatus,
    ) -> Result<ApplicationStatus, WorkflowError> {
        Self::transition(
            from,
            ApplicationStatus::InProgress,
            ApplicationStatus::ReadyForSubmission,
        )
    }

    /// Member submits a fully covered application.
    pub fn submit(from: ApplicationStatus) -> Result<ApplicationStatus, WorkflowError> {
        if from == ApplicationStatus::Submitted {
            return Err(WorkflowError::AlreadySubmitted);
        }
        Self::transition(
            from,
            ApplicationStatus::ReadyForSubmission,
            ApplicationStatus::Submitted,
        )
    }

    /// Administrator approves a submitted application.
    pub fn approve(from: ApplicationStatus) -> Result<ApplicationStatus, WorkflowError> {
        Self::transition(from, ApplicationStatus::Submitted, ApplicationStatus::Approved)
    }

    /// Administrator declines a submitted application.
    pub fn decline(from: ApplicationStatus) -> Result<ApplicationStatus, WorkflowError> {
        Self::transition(from, ApplicationStatus::Submitted, ApplicationStatus::Declined)
    }

    /// Administrator disburses an approved application.
    pub fn disburse(from: ApplicationStatus) -> Result<ApplicationStatus, WorkflowError> {
        Self::transition(from, ApplicationStatus::Approved, ApplicationStatus::Disbursed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let s = ApplicationStatus::Pending;
        let s = LoanWorkflow::submit_for_amendment(s).unwrap();
        assert_eq!(s, ApplicationStatus::ReadyForAmendment);
        let s = LoanWorkflow::amend(s).unwrap();
        assert_eq!(s, ApplicationStatus::Amended);
        let s = LoanWorkflow::accept_amendment(s, true).unwrap();
        assert_eq!(s, ApplicationStatus::ReadyForSubmission);
        let s = LoanWorkflow::submit(s).unwrap();
        assert_eq!(s, ApplicationStatus::Submitted);
        let s = LoanWorkflow::approve(s).unwrap();
        assert_eq!(s, ApplicationStatus::Approved);
        let s = LoanWorkflow::disburse(s).unwrap();
        assert_eq!(s, ApplicationStatus::Disbursed);
        assert!(s.is_terminal());
    }

    #[test]
    fn test_accept_amendment_partial_coverage() {
        let s = LoanWorkflow::accept_amendment(ApplicationStatus::Amended, false).unwrap();
        assert_eq!(s, ApplicationStatus::InProgress);
        let s = LoanWorkflow::mark_ready_for_submission(s).unwrap();
        assert_eq!(s, ApplicationStatus::ReadyForSubmission);
    }

    #[test]
    fn test_cancel_from_amended() {
        let s = LoanWorkflow::cancel(ApplicationStatus::Amended).unwrap();
        assert_eq!(s, ApplicationStatus::Cancelled);
        assert!(s.is_terminal());
    }

    #[test]
    fn test_cancel_requires_amended() {
        assert!(LoanWorkflow::cancel(ApplicationStatus::Pending).is_err());
        assert!(LoanWorkflow::cancel(ApplicationStatus::Submitted).is_err());
    }

    #[test]
    fn test_decline_from_submitted() {
        let s = LoanWorkflow::decline(ApplicationStatus::Submitted).unwrap();
        assert_eq!(s, ApplicationStatus::Declined);
    }

    #[test]
    fn test_double_submit_rejected() {
        let err = LoanWorkflow::submit(ApplicationStatus::Submitted).unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadySubmitted));
        assert_eq!(err.to_string(), "Already submitted");
    }

    #[test]
    fn test_no_transition_out_of_terminal() {
        for terminal in [
            ApplicationStatus::Disbursed,
            ApplicationStatus::Declined,
            ApplicationStatus::Cancelled,
        ] {
            assert!(matches!(
                LoanWorkflow::submit_for_amendment(terminal),
                Err(WorkflowError::Terminal(_))
            ));
            assert!(matches!(
                LoanWorkflow::approve(terminal),
                Err(WorkflowError::Terminal(_))
            ));
        }
    }

    #[test]
    fn test_submit_requires_ready_for_submission() {
        assert!(LoanWorkflow::submit(ApplicationStatus::InProgress).is_err());
        assert!(LoanWorkflow::submit(ApplicationStatus::Pending).is_err());
    }

    #[test]
    fn test_commitment_window() {
        assert!(ApplicationStatus::Submitted.is_committed());
        assert!(ApplicationStatus::Approved.is_committed());
        assert!(ApplicationStatus::Disbursed.is_committed());
        assert!(!ApplicationStatus::ReadyForSubmission.is_committed());
        assert!(!ApplicationStatus::Declined.is_committed());
    }

    #[test]
    fn test_pre_submission_window() {
        assert!(ApplicationStatus::Pending.is_pre_submission());
        assert!(ApplicationStatus::InProgress.is_pre_submission());
        assert!(!ApplicationStatus::Submitted.is_pre_submission());
        assert!(!ApplicationStatus::Cancelled.is_pre_submission());
    }
}
