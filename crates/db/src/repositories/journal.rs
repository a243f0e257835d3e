//! Transaction journal posting.
//!
//! Template resolution order: stored template by code, then the built-in
//! mapping (lazily persisted under an advisory lock), then - for fee
//! payments - a per-variant template derived from the fee type's
//! classification. Posting is idempotent on `(source_model, reference_id)`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use tamarind_core::catalog::FeeClassification;
use tamarind_core::ledger::posting::PostingService;
use tamarind_core::ledger::template::{self, TemplateLine};

use super::{advisory_xact_lock, now};
use crate::entities::{gl_accounts, journal_entries, journals, template_lines, transaction_templates};
use crate::error::{DbError, DbResult};

/// A template line resolved to a concrete GL account row.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    /// GL account id.
    pub gl_account_id: Uuid,
    /// GL account code.
    pub gl_code: String,
    /// Debit line when true.
    pub is_debit: bool,
}

/// Input for posting one balanced journal.
#[derive(Debug, Clone)]
pub struct PostJournal {
    /// Event code resolved against templates, e.g. `savings_deposit`.
    pub event_code: String,
    /// Fee classification for dynamic fee crediting, if the event is a
    /// fee payment.
    pub fee_classification: Option<FeeClassification>,
    /// Posting amount.
    pub amount: Decimal,
    /// Civil date of the underlying transaction.
    pub transaction_date: NaiveDate,
    /// Journal description.
    pub description: String,
    /// Source model tag of the idempotency key.
    pub source_model: String,
    /// Source row id of the idempotency key.
    pub reference_id: Uuid,
    /// Operator who caused the posting.
    pub posted_by: Uuid,
}

/// Repository for journal headers and entries.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds the journal posted for a source row, if any.
    pub async fn find_by_source(
        &self,
        source_model: &str,
        reference_id: Uuid,
    ) -> DbResult<Option<journals::Model>> {
        Ok(journals::Entity::find()
            .filter(journals::Column::SourceModel.eq(source_model))
            .filter(journals::Column::ReferenceId.eq(reference_id))
            .one(&self.db)
            .await?)
    }

    /// Entries of a journal.
    pub async fn entries(&self, journal_id: Uuid) -> DbResult<Vec<journal_entries::Model>> {
        Ok(journal_entries::Entity::find()
            .filter(journal_entries::Column::JournalId.eq(journal_id))
            .all(&self.db)
            .await?)
    }

    /// Posts a balanced journal inside the caller's transaction.
    ///
    /// Returns `None` when a journal for `(source_model, reference_id)`
    /// already exists - the posting is a no-op then.
    pub(crate) async fn post(
        txn: &DatabaseTransaction,
        input: PostJournal,
    ) -> DbResult<Option<journals::Model>> {
        let existing = journals::Entity::find()
            .filter(journals::Column::SourceModel.eq(input.source_model.clone()))
            .filter(journals::Column::ReferenceId.eq(input.reference_id))
            .one(txn)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let (template, lines) =
            Self::resolve_template(txn, &input.event_code, input.fee_classification).await?;

        // Validate through the core posting service before touching rows.
        let core_lines: Vec<TemplateLine> = lines
            .iter()
            .map(|line| TemplateLine {
                gl_code: line.gl_code.clone(),
                is_debit: line.is_debit,
            })
            .collect();
        let entry_amounts = PostingService::build(&core_lines, input.amount)?;

        let timestamp = now();
        let journal = journals::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_date: Set(input.transaction_date),
            description: Set(input.description),
            source_model: Set(input.source_model.clone()),
            reference_id: Set(input.reference_id),
            template_id: Set(Some(template.id)),
            posted_by: Set(input.posted_by),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(txn)
        .await?;

        for (line, amounts) in lines.iter().zip(entry_amounts.iter()) {
            journal_entries::ActiveModel {
                id: Set(Uuid::now_v7()),
                journal_id: Set(journal.id),
                gl_account_id: Set(line.gl_account_id),
                debit: Set(amounts.debit),
                credit: Set(amounts.credit),
                transaction_date: Set(input.transaction_date),
                source_model: Set(input.source_model.clone()),
                reference_id: Set(input.reference_id),
                created_at: Set(timestamp),
            }
            .insert(txn)
            .await?;
        }

        Ok(Some(journal))
    }

    /// Resolves an event code to a stored template and its lines, lazily
    /// persisting the built-in (or fee-classified) fallback on first use.
    pub(crate) async fn resolve_template(
        txn: &DatabaseTransaction,
        event_code: &str,
        fee_classification: Option<FeeClassification>,
    ) -> DbResult<(transaction_templates::Model, Vec<ResolvedLine>)> {
        if let Some(found) = Self::load_template(txn, event_code).await? {
            return Ok(found);
        }

        // First use of this event: create the template once across
        // concurrent posters.
        advisory_xact_lock(txn, &format!("template:{event_code}")).await?;
        if let Some(found) = Self::load_template(txn, event_code).await? {
            return Ok(found);
        }

        let fallback = match fee_classification {
            Some(classification) => template::fee_payment_lines(classification),
            None => template::resolve_lines(event_code, None)?,
        };

        let timestamp = now();
        let created = transaction_templates::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(event_code.to_string()),
            description: Set(None),
            reference: Set(tamarind_core::ident::generate_reference()),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(txn)
        .await?;

        let mut resolved = Vec::with_capacity(fallback.len());
        for line in fallback {
            let gl_account = gl_accounts::Entity::find()
                .filter(gl_accounts::Column::Code.eq(line.gl_code.clone()))
                .one(txn)
                .await?
                .ok_or_else(|| {
                    DbError::Integrity(format!("missing GL account code {}", line.gl_code))
                })?;

            template_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                template_id: Set(created.id),
                gl_account_id: Set(gl_account.id),
                is_debit: Set(line.is_debit),
                created_at: Set(timestamp),
            }
            .insert(txn)
            .await?;

            resolved.push(ResolvedLine {
                gl_account_id: gl_account.id,
                gl_code: gl_account.code,
                is_debit: line.is_debit,
            });
        }

        Ok((created, resolved))
    }

    async fn load_template(
        txn: &DatabaseTransaction,
        event_code: &str,
    ) -> DbResult<Option<(transaction_templates::Model, Vec<ResolvedLine>)>> {
        let Some(stored) = transaction_templates::Entity::find()
            .filter(transaction_templates::Column::Code.eq(event_code))
            .one(txn)
            .await?
        else {
            return Ok(None);
        };

        let lines = template_lines::Entity::find()
            .filter(template_lines::Column::TemplateId.eq(stored.id))
            .find_also_related(gl_accounts::Entity)
            .all(txn)
            .await?;

        let mut resolved = Vec::with_capacity(lines.len());
        for (line, gl_account) in lines {
            let gl_account = gl_account.ok_or_else(|| {
                DbError::Integrity(format!("template line {} lost its GL account", line.id))
            })?;
            resolved.push(ResolvedLine {
                gl_account_id: gl_account.id,
                gl_code: gl_account.code,
                is_debit: line.is_debit,
            });
        }

        if resolved.len() < 2 {
            return Err(DbError::Integrity(format!(
                "template {event_code} has fewer than two lines"
            )));
        }

        Ok(Some((stored, resolved)))
    }
}

/// Template code of a fee type: `fee_payment_` plus the slugified name.
#[must_use]
pub fn fee_event_code(fee_type_name: &str) -> String {
    let slug: String = fee_type_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    tamarind_core::ledger::template::fee_template_code(&slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_event_code_slug() {
        assert_eq!(fee_event_code("Registration"), "fee_payment_registration");
        assert_eq!(
            fee_event_code("Annual Membership Fee"),
            "fee_payment_annual_membership_fee"
        );
    }
}
