//! Bulk batch row accounting.
//!
//! The CSV file itself is parsed by an external collaborator; the
//! recognised column shapes and cell contracts here are the interface it
//! feeds. Each row is processed in its own savepoint by the repository
//! layer; outcomes accumulate into a batch summary that becomes the bulk
//! transaction log.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tamarind_shared::types::money::round2;

/// Errors raised while interpreting a bulk row cell.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BulkError {
    /// The cell is empty.
    #[error("{0} cell is empty")]
    MissingCell(String),
    /// The amount cell is not a decimal.
    #[error("amount '{0}' is not a valid decimal")]
    MalformedAmount(String),
    /// Amounts must be positive.
    #[error("amount '{0}' must be positive")]
    NonPositiveAmount(String),
    /// Amounts carry at most two fractional digits.
    #[error("amount '{0}' has more than two decimal places")]
    TooManyDecimals(String),
}

/// Recognised header shapes for combined uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnShape {
    /// `<TypeName> Account` - the target account number.
    Account(String),
    /// `<TypeName> Amount` - a deposit amount.
    Amount(String),
    /// `<TypeName> Payment Amount` - a payment amount.
    PaymentAmount(String),
    /// `Payment Method`.
    PaymentMethod,
}

/// Classifies a CSV header cell into a recognised column shape.
#[must_use]
pub fn column_shape(header: &str) -> Option<ColumnShape> {
    let header = header.trim();
    if header.eq_ignore_ascii_case("Payment Method") {
        return Some(ColumnShape::PaymentMethod);
    }
    if let Some(type_name) = header.strip_suffix(" Payment Amount") {
        return Some(ColumnShape::PaymentAmount(type_name.trim().to_string()));
    }
    if let Some(type_name) = header.strip_suffix(" Amount") {
        return Some(ColumnShape::Amount(type_name.trim().to_string()));
    }
    if let Some(type_name) = header.strip_suffix(" Account") {
        return Some(ColumnShape::Account(type_name.trim().to_string()));
    }
    None
}

/// Parses an amount cell: a positive decimal with at most two fractional
/// digits, normalised to two.
///
/// # Errors
///
/// Returns a `BulkError` naming the malformed cell.
pub fn parse_amount_cell(cell: &str) -> Result<Decimal, BulkError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Err(BulkError::MissingCell("amount".to_string()));
    }
    let amount: Decimal = trimmed
        .parse()
        .map_err(|_| BulkError::MalformedAmount(trimmed.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(BulkError::NonPositiveAmount(trimmed.to_string()));
    }
    if amount.scale() > 2 {
        return Err(BulkError::TooManyDecimals(trimmed.to_string()));
    }
    Ok(round2(amount))
}

/// Synthetic reference of one bulk row: `<PREFIX>-<INDEX:04>`.
#[must_use]
pub fn row_reference(prefix: &str, index: u32) -> String {
    format!("{prefix}-{index:04}")
}

/// A failed row, captured without aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Zero-based row index.
    pub index: u32,
    /// The failure message.
    pub error: String,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// At least one row succeeded.
    Created,
    /// Every row failed (or the batch was empty).
    AllFailed,
}

/// Per-row success/failure accumulator for one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Rows that settled.
    pub success_count: u32,
    /// Rows that failed.
    pub error_count: u32,
    /// Captured failures, in row order.
    pub failures: Vec<RowFailure>,
}

impl BatchSummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one settled row.
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// Records one failed row without aborting the batch.
    pub fn record_failure(&mut self, index: u32, error: impl Into<String>) {
        self.error_count += 1;
        self.failures.push(RowFailure {
            index,
            error: error.into(),
        });
    }

    /// The batch outcome the API surface maps to a status code.
    #[must_use]
    pub fn outcome(&self) -> BatchOutcome {
        if self.success_count > 0 {
            BatchOutcome::Created
        } else {
            BatchOutcome::AllFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_column_shapes() {
        assert_eq!(
            column_shape("Main Savings Account"),
            Some(ColumnShape::Account("Main Savings".to_string()))
        );
        assert_eq!(
            column_shape("Main Savings Amount"),
            Some(ColumnShape::Amount("Main Savings".to_string()))
        );
        assert_eq!(
            column_shape("Development Loan Payment Amount"),
            Some(ColumnShape::PaymentAmount("Development Loan".to_string()))
        );
        assert_eq!(column_shape("Payment Method"), Some(ColumnShape::PaymentMethod));
        assert_eq!(column_shape("Member Name"), None);
    }

    #[test]
    fn test_parse_amount_cell_ok() {
        assert_eq!(parse_amount_cell("500.00").unwrap(), dec!(500.00));
        assert_eq!(parse_amount_cell(" 1200.5 ").unwrap(), dec!(1200.50));
        assert_eq!(parse_amount_cell("75").unwrap(), dec!(75.00));
    }

    #[test]
    fn test_parse_amount_cell_failures() {
        assert_eq!(
            parse_amount_cell(""),
            Err(BulkError::MissingCell("amount".to_string()))
        );
        assert!(matches!(
            parse_amount_cell("abc"),
            Err(BulkError::MalformedAmount(_))
        ));
        assert!(matches!(
            parse_amount_cell("-10.00"),
            Err(BulkError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            parse_amount_cell("0"),
            Err(BulkError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            parse_amount_cell("10.001"),
            Err(BulkError::TooManyDecimals(_))
        ));
    }

    #[test]
    fn test_row_reference_format() {
        assert_eq!(
            row_reference("SAVINGS_DEPOSIT-BULK-20260806", 1),
            "SAVINGS_DEPOSIT-BULK-20260806-0001"
        );
        assert_eq!(row_reference("X", 423), "X-0423");
    }

    #[test]
    fn test_batch_summary_outcome() {
        let mut summary = BatchSummary::new();
        assert_eq!(summary.outcome(), BatchOutcome::AllFailed);

        summary.record_failure(0, "bad amount");
        assert_eq!(summary.outcome(), BatchOutcome::AllFailed);

        summary.record_success();
        assert_eq!(summary.outcome(), BatchOutcome::Created);
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.failures[0].index, 0);
    }
}
