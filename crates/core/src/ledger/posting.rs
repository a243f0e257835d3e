//! Balanced-posting validation and entry construction.
//!
//! The posting service is pure: it turns resolved template lines and an
//! amount into debit/credit entry amounts and rejects anything that would
//! leave the journal unbalanced. The repository layer persists the header
//! and entries and enforces the `(source_model, reference_id)` idempotency
//! key.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::template::TemplateLine;

/// Debit/credit amounts for one journal entry, derived from a template
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAmounts {
    /// GL account code the entry posts to.
    pub gl_code: String,
    /// Debit amount (zero for credit entries).
    pub debit: Decimal,
    /// Credit amount (zero for debit entries).
    pub credit: Decimal,
}

/// Stateless posting construction and validation.
pub struct PostingService;

impl PostingService {
    /// Builds journal entry amounts from template lines and a posting
    /// amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the template has
    /// fewer than two lines, or the resulting entries do not balance.
    pub fn build(
        lines: &[TemplateLine],
        amount: Decimal,
    ) -> Result<Vec<EntryAmounts>, LedgerError> {
        if amount == Decimal::ZERO {
            return Err(LedgerError::ZeroAmount);
        }
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if lines.len() < 2 {
            return Err(LedgerError::InsufficientEntries);
        }

        let entries: Vec<EntryAmounts> = lines
            .iter()
            .map(|line| EntryAmounts {
                gl_code: line.gl_code.clone(),
                debit: if line.is_debit { amount } else { Decimal::ZERO },
                credit: if line.is_debit { Decimal::ZERO } else { amount },
            })
            .collect();

        Self::validate(&entries)?;
        Ok(entries)
    }

    /// Validates a set of journal entries.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than two entries, any entry sets
    /// both or neither side, any amount is negative, or totals do not
    /// balance.
    pub fn validate(entries: &[EntryAmounts]) -> Result<(), LedgerError> {
        if entries.len() < 2 {
            return Err(LedgerError::InsufficientEntries);
        }

        for entry in entries {
            if entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO {
                return Err(LedgerError::NegativeAmount);
            }
            let debit_set = entry.debit > Decimal::ZERO;
            let credit_set = entry.credit > Decimal::ZERO;
            if debit_set == credit_set {
                return Err(LedgerError::MixedEntry);
            }
        }

        let debit: Decimal = entries.iter().map(|e| e.debit).sum();
        let credit: Decimal = entries.iter().map(|e| e.credit).sum();
        if debit != credit {
            return Err(LedgerError::UnbalancedJournal { debit, credit });
        }
        Ok(())
    }
}
