//! Application-wide error types.

use std::collections::BTreeMap;

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Each variant maps to the HTTP status the external API surface would
/// return; see `status_code`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller-supplied data violates an invariant. Carries a
    /// field-to-message map for the API surface to serialize verbatim.
    #[error("Validation error: {}", format_fields(.0))]
    Validation(BTreeMap<String, String>),

    /// Uniqueness collision (reference, identity, account number) after the
    /// retry budget is exhausted.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource lookup failed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Attempt to advance a loan application, guarantee request, or
    /// withdrawal from a non-permitted state.
    #[error("Invalid state transition: {0}")]
    StateTransition(String),

    /// Access denied for the acting member's role.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// A posting would leave the ledger unbalanced or an account negative.
    /// Fatal to the enclosing transaction.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Lock timeout, deadlock, or storage unavailability. The caller may
    /// retry.
    #[error("Transient failure: {0}")]
    Transient(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// External collaborator error (mail, archive upload).
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_fields(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    /// Builds a single-field validation error.
    #[must_use]
    pub fn validation(field: &str, message: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.to_string());
        Self::Validation(fields)
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::StateTransition(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Transient(_) => 503,
            Self::Integrity(_) | Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => {
                500
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::StateTransition(_) => "STATE_TRANSITION_ERROR",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Integrity(_) => "INTEGRITY_ERROR",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
