//! Crate-wide database error type.
//!
//! Repositories return `DbError`; the API collaborator maps it onto
//! `tamarind_shared::AppError` for status codes.

use sea_orm::DbErr;
use thiserror::Error;

use tamarind_shared::AppError;

/// Result alias for repository operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Caller-supplied data violates an invariant.
    #[error("validation error on {field}: {message}")]
    Validation {
        /// Offending field.
        field: String,
        /// Human message.
        message: String,
    },

    /// Uniqueness collision after the retry budget was exhausted.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource lookup failed.
    #[error("not found: {0}")]
    NotFound(String),

    /// Workflow advanced from a non-permitted state.
    #[error("invalid state: {0}")]
    State(String),

    /// The acting member is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A posting would leave the ledger unbalanced or an account negative.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Lock timeout, deadlock, or storage unavailability; the caller may
    /// retry.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl DbError {
    /// Builds a single-field validation error.
    #[must_use]
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Returns true if the underlying cause is a unique-constraint
    /// violation, used by generators to retry with a fresh value.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(err) => err.to_string().contains("duplicate key"),
            _ => false,
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation { field, message } => Self::validation(&field, &message),
            DbError::Conflict(msg) => Self::Conflict(msg),
            DbError::NotFound(msg) => Self::NotFound(msg),
            DbError::State(msg) => Self::StateTransition(msg),
            DbError::Forbidden(msg) => Self::Forbidden(msg),
            DbError::Integrity(msg) => Self::Integrity(msg),
            DbError::Transient(msg) => Self::Transient(msg),
            DbError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<tamarind_core::ledger::LedgerError> for DbError {
    fn from(err: tamarind_core::ledger::LedgerError) -> Self {
        use tamarind_core::ledger::LedgerError;
        match err {
            LedgerError::UnbalancedJournal { .. }
            | LedgerError::InsufficientEntries
            | LedgerError::MixedEntry => Self::Integrity(err.to_string()),
            LedgerError::ZeroAmount | LedgerError::NegativeAmount => {
                Self::validation("amount", err.to_string())
            }
            LedgerError::UnknownEvent(_)
            | LedgerError::UnknownAccountCode(_)
            | LedgerError::InvalidParent(_) => Self::Integrity(err.to_string()),
        }
    }
}

impl From<tamarind_core::loan::WorkflowError> for DbError {
    fn from(err: tamarind_core::loan::WorkflowError) -> Self {
        Self::State(err.to_string())
    }
}

impl From<tamarind_core::loan::AmortisationError> for DbError {
    fn from(err: tamarind_core::loan::AmortisationError) -> Self {
        Self::validation("projection", err.to_string())
    }
}

impl From<tamarind_core::guarantee::GuaranteeError> for DbError {
    fn from(err: tamarind_core::guarantee::GuaranteeError) -> Self {
        use tamarind_core::guarantee::GuaranteeError;
        match err {
            GuaranteeError::InvalidTransition { .. } | GuaranteeError::ApplicationNotOpen(_) => {
                Self::State(err.to_string())
            }
            GuaranteeError::Duplicate => Self::Conflict(err.to_string()),
            GuaranteeError::CommitmentOverflow { .. } => Self::Integrity(err.to_string()),
            GuaranteeError::NonPositiveAmount(_)
            | GuaranteeError::ExceedsCapacity { .. }
            | GuaranteeError::NotEligible => Self::validation("guarantee", err.to_string()),
        }
    }
}

impl From<tamarind_core::transaction::TransactionError> for DbError {
    fn from(err: tamarind_core::transaction::TransactionError) -> Self {
        use tamarind_core::transaction::TransactionError;
        match err {
            TransactionError::NonPositiveAmount(_) => Self::validation("amount", err.to_string()),
            TransactionError::InvalidTransition { .. } | TransactionError::Immutable => {
                Self::State(err.to_string())
            }
        }
    }
}

impl From<tamarind_core::catalog::CatalogError> for DbError {
    fn from(err: tamarind_core::catalog::CatalogError) -> Self {
        Self::validation("product_type", err.to_string())
    }
}

impl From<tamarind_core::auth::PasswordError> for DbError {
    fn from(err: tamarind_core::auth::PasswordError) -> Self {
        Self::validation("password", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_app_error_statuses() {
        assert_eq!(
            AppError::from(DbError::validation("amount", "must be positive")).status_code(),
            400
        );
        assert_eq!(
            AppError::from(DbError::NotFound("member".into())).status_code(),
            404
        );
        assert_eq!(
            AppError::from(DbError::Conflict("reference".into())).status_code(),
            409
        );
        assert_eq!(
            AppError::from(DbError::State("Already submitted".into())).status_code(),
            400
        );
        assert_eq!(
            AppError::from(DbError::Integrity("unbalanced".into())).status_code(),
            500
        );
        assert_eq!(
            AppError::from(DbError::Transient("deadlock".into())).status_code(),
            503
        );
    }

    #[test]
    fn test_workflow_error_maps_to_state() {
        let err: DbError = tamarind_core::loan::WorkflowError::AlreadySubmitted.into();
        assert!(matches!(err, DbError::State(_)));
        assert_eq!(err.to_string(), "invalid state: Already submitted");
    }
}
