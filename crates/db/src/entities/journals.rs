//! `SeaORM` Entity for the journals table.
//!
//! One header groups two or more balanced entries. The
//! `(source_model, reference_id)` pair is the posting idempotency key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_date: Date,
    pub description: String,
    /// Source model tag, e.g. `transaction`.
    pub source_model: String,
    /// Id of the source row.
    pub reference_id: Uuid,
    pub template_id: Option<Uuid>,
    /// Operator who caused the posting.
    pub posted_by: Uuid,
    pub reference: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entries::Entity")]
    JournalEntries,
    #[sea_orm(
        belongs_to = "super::transaction_templates::Entity",
        from = "Column::TemplateId",
        to = "super::transaction_templates::Column::Id"
    )]
    TransactionTemplates,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::transaction_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionTemplates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
